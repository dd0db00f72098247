//! Core types for centerline route planning: point sets, branches, routes.
//!
//! This crate provides the data model for navigating tubular anatomy
//! (airways, vessels) along a skeletonized centerline.
//!
//! # Overview
//!
//! - **Input**: [`CenterlinePointSet`] with a [`Topology`] describing how the
//!   points connect
//! - **Tree**: [`Branch`] runs of points stored in a [`BranchList`] arena,
//!   linked by [`BranchId`] and [`ParentLink`]
//! - **Output**: [`Route`] from a target's projection to the root, and
//!   [`RoutePolyline`] geometry for rendering
//! - **Configuration**: [`DecompositionConfig`], [`RouteConfig`],
//!   [`RouteToTargetConfig`]
//! - **Errors**: [`CenterlineError`]
//!
//! The algorithms that build branch lists and extract routes live in the
//! `centerline-route` crate.
//!
//! # Example
//!
//! ```
//! use centerline_types::{Branch, BranchList, ParentLink, CenterlineError};
//! use nalgebra::Point3;
//!
//! let mut list = BranchList::new();
//! let trachea = list
//!     .push_branch(Branch::new(vec![Point3::origin(), Point3::new(0.0, 0.0, -1.0)]), None)
//!     .unwrap();
//! list.push_branch(
//!     Branch::new(vec![Point3::new(0.5, 0.0, -1.5)]),
//!     Some(ParentLink::new(trachea, 1)),
//! )
//! .unwrap();
//!
//! assert_eq!(list.len(), 2);
//! assert!(list.validate_topology().is_ok());
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for all types

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod branch;
pub mod branch_list;
pub mod config;
pub mod error;
pub mod point_set;
pub mod route;

pub use branch::{Branch, BranchId, ParentLink};
pub use branch_list::BranchList;
pub use config::{ContinuationRule, DecompositionConfig, RouteConfig, RouteToTargetConfig};
pub use error::{CenterlineError, CenterlineResult};
pub use point_set::{CenterlinePointSet, Topology};
pub use route::{ClosestPoint, Route, RoutePolyline};

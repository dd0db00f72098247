//! Route-to-target extraction along airway and vessel centerlines.
//!
//! This crate implements the planning pipeline on top of the
//! `centerline-types` data model.
//!
//! # Overview
//!
//! ```text
//! raw polyline -> branch decomposition -> nearest branch point
//!              -> upstream traversal   -> ordered route -> polyline
//! ```
//!
//! - **Decomposition** ([`decompose::decompose`]): splits a centerline into a
//!   [`BranchList`](centerline_types::BranchList) at its bifurcations
//! - **Projection** ([`nearest::find_closest_point_in_branches`]): finds the
//!   branch point closest to a target
//! - **Traversal** ([`traverse::search_branch_up`]): walks from that point to
//!   the start of the root branch
//! - **Planner** ([`RouteToTarget`]): owns the branch list for a session and
//!   produces [`Route`](centerline_types::Route)s and polylines
//!
//! # Quick Start
//!
//! ```
//! use centerline_route::RouteToTarget;
//! use centerline_types::CenterlinePointSet;
//! use nalgebra::Point3;
//!
//! // Root branch A along x (5 points), branch B along y from A's end.
//! let mut points: Vec<_> = (0..5).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
//! points.extend((1..=3).map(|i| Point3::new(4.0, f64::from(i), 0.0)));
//! let ids = vec![0, 0, 0, 0, 0, 1, 1, 1];
//! let centerline = CenterlinePointSet::with_branch_ids(points, ids).unwrap();
//!
//! let mut planner = RouteToTarget::new();
//! let branches = planner.set_centerline(&centerline).unwrap();
//! assert_eq!(branches.len(), 2);
//!
//! let route = planner.find_route_to_target(&Point3::new(4.2, 3.1, 0.0)).unwrap();
//! assert_eq!(route.len(), 8);
//! assert_eq!(route.first(), Some(&Point3::new(4.0, 3.0, 0.0)));
//! assert_eq!(route.last(), Some(&Point3::new(0.0, 0.0, 0.0)));
//! ```
//!
//! # Concurrency
//!
//! Everything is synchronous. [`RouteToTarget`] mutates only through
//! `&mut self`; callers sharing one planner between a UI thread and a worker
//! must wrap it in a lock.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod adjacency;
pub mod decompose;
pub mod nearest;
pub mod target;
pub mod traverse;

pub use adjacency::{CenterlineGraph, RootedTree};
pub use decompose::decompose;
pub use nearest::find_closest_point_in_branches;
pub use target::{MAX_EXTENSION_POINTS, RouteToTarget, extend_to_target};
pub use traverse::{RouteSearchState, TraversalState, search_branch_up};

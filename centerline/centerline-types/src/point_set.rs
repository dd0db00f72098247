//! Raw centerline input.
//!
//! A [`CenterlinePointSet`] is the skeletonized structure as delivered by the
//! data-loading side: an ordered list of 3D points plus a description of how
//! the points are connected.
//!
//! # Example
//!
//! ```
//! use centerline_types::{CenterlinePointSet, Topology};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//! ];
//! let centerline = CenterlinePointSet::from_points(points);
//!
//! assert_eq!(centerline.len(), 3);
//! assert!(matches!(centerline.topology(), Topology::Sequential));
//! ```

use nalgebra::Point3;

use crate::error::{CenterlineError, CenterlineResult};

/// How the points of a centerline are connected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// Consecutive points are connected; the input is a single polyline.
    #[default]
    Sequential,

    /// Explicit line cells joining pairs of point indices.
    ///
    /// This is the connectivity found in the lines of a skeletonized
    /// poly-data object.
    Edges(Vec<[usize; 2]>),

    /// One branch tag per point.
    ///
    /// Every run of consecutive points sharing a tag forms one branch. A tag
    /// transition marks a bifurcation, even when the new tag was seen before.
    BranchIds(Vec<u32>),
}

/// An ordered set of centerline points with connectivity.
///
/// The point set is immutable once built. Structural checks (index ranges,
/// tag counts) happen in the constructors; decomposition repeats them for
/// point sets that bypassed the constructors through deserialization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CenterlinePointSet {
    points: Vec<Point3<f64>>,
    topology: Topology,
}

impl CenterlinePointSet {
    /// Creates a point set where consecutive points are connected.
    #[must_use]
    pub const fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            topology: Topology::Sequential,
        }
    }

    /// Creates a point set from points and explicit line cells.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::MalformedCenterline`] if an edge refers to a
    /// point that does not exist or joins a point to itself.
    ///
    /// # Example
    ///
    /// ```
    /// use centerline_types::CenterlinePointSet;
    /// use nalgebra::Point3;
    ///
    /// let points = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
    /// assert!(CenterlinePointSet::with_edges(points.clone(), vec![[0, 1]]).is_ok());
    /// assert!(CenterlinePointSet::with_edges(points, vec![[0, 2]]).is_err());
    /// ```
    pub fn with_edges(points: Vec<Point3<f64>>, edges: Vec<[usize; 2]>) -> CenterlineResult<Self> {
        let n = points.len();
        for &[a, b] in &edges {
            if a >= n || b >= n {
                return Err(CenterlineError::malformed(format!(
                    "edge ({a}, {b}) refers to a point outside 0..{n}"
                )));
            }
            if a == b {
                return Err(CenterlineError::malformed(format!(
                    "edge ({a}, {b}) connects a point to itself"
                )));
            }
        }

        Ok(Self {
            points,
            topology: Topology::Edges(edges),
        })
    }

    /// Creates a point set from points and one branch tag per point.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::MalformedCenterline`] if the number of tags
    /// differs from the number of points.
    pub fn with_branch_ids(points: Vec<Point3<f64>>, ids: Vec<u32>) -> CenterlineResult<Self> {
        if ids.len() != points.len() {
            return Err(CenterlineError::malformed(format!(
                "{} branch ids given for {} points",
                ids.len(),
                points.len()
            )));
        }

        Ok(Self {
            points,
            topology: Topology::BranchIds(ids),
        })
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Returns the point at the given index.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&Point3<f64>> {
        self.points.get(index)
    }

    /// Returns the connectivity description.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<Point3<f64>> for CenterlinePointSet {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

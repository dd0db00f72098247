//! Routes from a target to the tree root.
//!
//! A [`Route`] is stored root-directed: it starts at the centerline point
//! closest to the target and ends at the first point of the root branch.
//! Renderers usually want the opposite order, which
//! [`Route::display_positions`] and [`Route::to_polyline`] provide.
//!
//! # Example
//!
//! ```
//! use centerline_types::{BranchId, ClosestPoint, Route};
//! use nalgebra::Point3;
//!
//! let projection = ClosestPoint::new(BranchId::new(0), 2, Point3::new(2.0, 0.0, 0.0), 0.0);
//! let route = Route::new(
//!     vec![
//!         Point3::new(2.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 0.0, 0.0),
//!     ],
//!     vec![BranchId::new(0)],
//!     projection,
//!     Point3::new(2.0, 0.0, 0.0),
//! );
//!
//! assert_eq!(route.len(), 3);
//! assert_eq!(route.first(), Some(&Point3::new(2.0, 0.0, 0.0)));
//! assert_eq!(route.reversed()[0], Point3::new(0.0, 0.0, 0.0));
//! assert!((route.length() - 2.0).abs() < 1e-10);
//! ```

use nalgebra::Point3;

use crate::branch::BranchId;

/// The centerline point closest to a query coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosestPoint {
    /// Branch holding the point.
    pub branch: BranchId,
    /// Index of the point within the branch.
    pub index: usize,
    /// Position of the point.
    pub position: Point3<f64>,
    /// Euclidean distance from the query coordinate.
    pub distance: f64,
}

impl ClosestPoint {
    /// Creates a new closest-point record.
    #[must_use]
    pub const fn new(branch: BranchId, index: usize, position: Point3<f64>, distance: f64) -> Self {
        Self {
            branch,
            index,
            position,
            distance,
        }
    }
}

/// An ordered path from a target's projection up to the tree root.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Root-directed positions: projection first, root start last.
    positions: Vec<Point3<f64>>,
    /// Branches crossed, in traversal order.
    branches: Vec<BranchId>,
    projection: ClosestPoint,
    target: Point3<f64>,
    /// Straight continuation from the projection towards the target,
    /// excluding the projection itself.
    extension: Vec<Point3<f64>>,
}

impl Route {
    /// Creates a route from root-directed positions.
    #[must_use]
    pub const fn new(
        positions: Vec<Point3<f64>>,
        branches: Vec<BranchId>,
        projection: ClosestPoint,
        target: Point3<f64>,
    ) -> Self {
        Self {
            positions,
            branches,
            projection,
            target,
            extension: Vec::new(),
        }
    }

    /// Attaches a straight extension from the projection to the target.
    #[must_use]
    pub fn with_extension(mut self, extension: Vec<Point3<f64>>) -> Self {
        self.extension = extension;
        self
    }

    /// Returns the root-directed positions.
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Returns the branches crossed, starting with the projection's branch.
    #[must_use]
    pub fn branches(&self) -> &[BranchId] {
        &self.branches
    }

    /// Returns the centerline point the target was projected onto.
    #[must_use]
    pub const fn projection(&self) -> &ClosestPoint {
        &self.projection
    }

    /// Returns the queried target coordinate.
    #[must_use]
    pub const fn target(&self) -> &Point3<f64> {
        &self.target
    }

    /// Returns the extension towards the target (empty unless requested).
    #[must_use]
    pub fn extension(&self) -> &[Point3<f64>] {
        &self.extension
    }

    /// Returns the number of root-directed positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the route has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the projection end of the route.
    #[must_use]
    pub fn first(&self) -> Option<&Point3<f64>> {
        self.positions.first()
    }

    /// Returns the root end of the route.
    #[must_use]
    pub fn last(&self) -> Option<&Point3<f64>> {
        self.positions.last()
    }

    /// Returns the arc length along the centerline part of the route.
    #[must_use]
    pub fn length(&self) -> f64 {
        polyline_length(&self.positions)
    }

    /// Returns the arc length including the extension to the target.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        let extension = self
            .positions
            .first()
            .into_iter()
            .chain(self.extension.iter())
            .copied()
            .collect::<Vec<_>>();
        self.length() + polyline_length(&extension)
    }

    /// Returns the positions ordered root first, projection last.
    #[must_use]
    pub fn reversed(&self) -> Vec<Point3<f64>> {
        self.positions.iter().rev().copied().collect()
    }

    /// Returns the positions in display order: root to projection, then
    /// along the extension to the target.
    #[must_use]
    pub fn display_positions(&self) -> Vec<Point3<f64>> {
        let mut points = self.reversed();
        points.extend_from_slice(&self.extension);
        points
    }

    /// Converts the route into render-ready polyline geometry.
    #[must_use]
    pub fn to_polyline(&self) -> RoutePolyline {
        RoutePolyline::from_points(self.display_positions())
    }
}

/// Polyline geometry for a rendering collaborator.
///
/// Points plus line cells joining consecutive points, the layout expected by
/// poly-data style renderers.
///
/// # Example
///
/// ```
/// use centerline_types::RoutePolyline;
/// use nalgebra::Point3;
///
/// let polyline = RoutePolyline::from_points(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, 3.0, 4.0),
/// ]);
///
/// assert_eq!(polyline.lines(), &[[0, 1]]);
/// assert!((polyline.length() - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePolyline {
    points: Vec<Point3<f64>>,
    lines: Vec<[usize; 2]>,
}

impl RoutePolyline {
    /// Builds a polyline joining each point to the next.
    #[must_use]
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        let lines = (1..points.len()).map(|i| [i - 1, i]).collect();
        Self { points, lines }
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Returns the line cells as point index pairs.
    #[must_use]
    pub fn lines(&self) -> &[[usize; 2]] {
        &self.lines
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

    /// Returns the total length of all line cells.
    #[must_use]
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

fn polyline_length(points: &[Point3<f64>]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

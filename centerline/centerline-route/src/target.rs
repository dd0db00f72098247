//! Route-to-target planning over a decomposed centerline.
//!
//! [`RouteToTarget`] ties the pipeline together for one planning session:
//!
//! 1. [`RouteToTarget::set_centerline`] decomposes the raw centerline into a
//!    [`BranchList`], discarding any earlier list and route.
//! 2. [`RouteToTarget::find_route_to_target`] projects a target onto the
//!    closest branch point, walks upstream to the root and stores the
//!    resulting [`Route`].
//! 3. [`RouteToTarget::route_polyline`] hands the route to the renderer.
//!
//! # Example
//!
//! ```
//! use centerline_route::RouteToTarget;
//! use centerline_types::CenterlinePointSet;
//! use nalgebra::Point3;
//!
//! let points: Vec<_> = (0..10).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
//!
//! let mut planner = RouteToTarget::new();
//! planner.set_centerline(&CenterlinePointSet::from_points(points)).unwrap();
//!
//! let route = planner.find_route_to_target(&Point3::new(7.0, 0.5, 0.0)).unwrap();
//! assert_eq!(route.len(), 8);
//! assert_eq!(route.first(), Some(&Point3::new(7.0, 0.0, 0.0)));
//! assert_eq!(route.last(), Some(&Point3::new(0.0, 0.0, 0.0)));
//!
//! let polyline = planner.route_polyline().unwrap();
//! assert_eq!(polyline.points()[0], Point3::new(0.0, 0.0, 0.0));
//! ```

use centerline_types::{
    BranchId, BranchList, CenterlineError, CenterlinePointSet, CenterlineResult, ClosestPoint,
    Route, RoutePolyline, RouteToTargetConfig,
};
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::decompose::decompose;
use crate::nearest::{check_target, find_closest_point_in_branches};
use crate::traverse::{RouteSearchState, search_branch_up};

/// Planner extracting routes from a target to the root of a centerline tree.
///
/// All mutation goes through `&mut self`; share a planner between threads
/// behind a lock. Searches keep their traversal state locally, so queries
/// never see each other's intermediate results.
#[derive(Debug, Clone, Default)]
pub struct RouteToTarget {
    config: RouteToTargetConfig,
    branch_list: Option<BranchList>,
    route: Option<Route>,
}

impl RouteToTarget {
    /// Creates a planner with default configuration and no centerline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a planner with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::InvalidConfig`] listing every issue found
    /// by [`RouteToTargetConfig::validate`].
    pub fn with_config(config: RouteToTargetConfig) -> CenterlineResult<Self> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(CenterlineError::invalid_config(issues.join("; ")));
        }

        Ok(Self {
            config,
            branch_list: None,
            route: None,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RouteToTargetConfig {
        &self.config
    }

    /// Builds the branch list for a new centerline.
    ///
    /// Any previous branch list and route are discarded first, so a failed
    /// call leaves the planner without a centerline.
    ///
    /// # Errors
    ///
    /// Propagates decomposition errors; see
    /// [`decompose`](crate::decompose::decompose).
    pub fn set_centerline(
        &mut self,
        centerline: &CenterlinePointSet,
    ) -> CenterlineResult<&BranchList> {
        self.clear();

        let list = decompose(centerline, self.config.decomposition()).inspect_err(|e| {
            warn!(error = %e, "Rejected centerline");
        })?;

        Ok(self.branch_list.insert(list))
    }

    /// Returns the current branch list, if a centerline has been set.
    #[must_use]
    pub const fn branch_list(&self) -> Option<&BranchList> {
        self.branch_list.as_ref()
    }

    /// Finds the branch point closest to `target`.
    ///
    /// # Errors
    ///
    /// [`CenterlineError::EmptyBranchList`] before a centerline is set, or
    /// [`CenterlineError::InvalidTarget`] for a non-finite target.
    pub fn find_closest_point_in_branches(
        &self,
        target: &Point3<f64>,
    ) -> CenterlineResult<ClosestPoint> {
        find_closest_point_in_branches(self.require_branch_list()?, target)
    }

    /// Walks from `start_index` of `branch` up to the root.
    ///
    /// # Errors
    ///
    /// [`CenterlineError::EmptyBranchList`] before a centerline is set, plus
    /// the errors of [`search_branch_up`].
    pub fn search_branch_up(
        &self,
        branch: BranchId,
        start_index: usize,
    ) -> CenterlineResult<RouteSearchState> {
        search_branch_up(self.require_branch_list()?, branch, start_index)
    }

    /// Computes the route for `target` without storing it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::find_route_to_target`].
    pub fn plan_route(&self, target: &Point3<f64>) -> CenterlineResult<Route> {
        let list = self.require_branch_list()?;
        check_target(target)?;

        let projection = find_closest_point_in_branches(list, target)?;
        debug!(
            branch = %projection.branch,
            index = projection.index,
            distance = projection.distance,
            "Projected target onto centerline"
        );

        let (positions, branches) =
            search_branch_up(list, projection.branch, projection.index)?.into_parts();
        let mut route = Route::new(positions, branches, projection, *target);

        let route_config = self.config.route();
        if route_config.extend_to_target() {
            route = route.with_extension(extend_to_target(
                &projection.position,
                target,
                route_config.extension_step(),
            ));
        }

        Ok(route)
    }

    /// Computes and stores the route from `target` to the root.
    ///
    /// Calling this twice with the same target on an unchanged centerline
    /// yields identical routes. On error the stored route is left as it was.
    ///
    /// # Errors
    ///
    /// - [`CenterlineError::EmptyBranchList`] before a centerline is set.
    /// - [`CenterlineError::InvalidTarget`] for a non-finite target.
    /// - [`CenterlineError::BrokenBranchTopology`] if the branch tree is
    ///   corrupt.
    pub fn find_route_to_target(&mut self, target: &Point3<f64>) -> CenterlineResult<&Route> {
        let route = self.plan_route(target)?;

        info!(
            points = route.len(),
            branches = route.branches().len(),
            length = route.length(),
            "Found route to target"
        );

        Ok(self.route.insert(route))
    }

    /// Returns the most recently found route.
    #[must_use]
    pub const fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Returns the stored route as render-ready polyline geometry.
    #[must_use]
    pub fn route_polyline(&self) -> Option<RoutePolyline> {
        self.route.as_ref().map(Route::to_polyline)
    }

    /// Drops the branch list and any stored route.
    pub fn clear(&mut self) {
        self.branch_list = None;
        self.route = None;
    }

    fn require_branch_list(&self) -> CenterlineResult<&BranchList> {
        self.branch_list
            .as_ref()
            .filter(|list| !list.is_empty())
            .ok_or(CenterlineError::EmptyBranchList)
    }
}

/// Largest number of points [`extend_to_target`] produces.
pub const MAX_EXTENSION_POINTS: usize = 10_000;

/// Points on the straight line from `projection` to `target`, spaced `step`
/// apart.
///
/// The projection itself is excluded and the target is always the last
/// point. Returns an empty vector when the two coincide. If more than
/// [`MAX_EXTENSION_POINTS`] points would be needed, the spacing widens to
/// `distance / MAX_EXTENSION_POINTS`.
///
/// # Example
///
/// ```
/// use centerline_route::target::extend_to_target;
/// use nalgebra::Point3;
///
/// let points = extend_to_target(&Point3::origin(), &Point3::new(1.2, 0.0, 0.0), 0.5);
/// assert_eq!(points.len(), 3);
/// assert_eq!(points[2], Point3::new(1.2, 0.0, 0.0));
/// ```
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn extend_to_target(
    projection: &Point3<f64>,
    target: &Point3<f64>,
    step: f64,
) -> Vec<Point3<f64>> {
    let offset = target - projection;
    let distance = offset.norm();
    if distance <= f64::EPSILON || step.is_nan() || step <= 0.0 {
        return Vec::new();
    }

    // The tolerance keeps an exact multiple of `step` from adding a point on
    // top of the target.
    let count = ((distance / step - 1e-6).ceil() as usize).clamp(1, MAX_EXTENSION_POINTS);
    let spacing = if count == MAX_EXTENSION_POINTS {
        distance / count as f64
    } else {
        step
    };

    let direction = offset / distance;
    let mut points: Vec<_> = (1..count)
        .map(|k| projection + direction * (k as f64 * spacing))
        .collect();
    points.push(*target);
    points
}

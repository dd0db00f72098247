//! Nearest-branch-point search.
//!
//! Projects a target coordinate onto the centerline by scanning every branch
//! point. Centerlines hold hundreds to a few thousand points, so a linear
//! scan is fast enough and keeps the tie-break rule exact.
//!
//! # Example
//!
//! ```
//! use centerline_route::nearest::find_closest_point_in_branches;
//! use centerline_types::{Branch, BranchList};
//! use nalgebra::Point3;
//!
//! let mut list = BranchList::new();
//! list.push_branch(
//!     Branch::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]),
//!     None,
//! )
//! .unwrap();
//!
//! let closest = find_closest_point_in_branches(&list, &Point3::new(0.9, 0.2, 0.0)).unwrap();
//! assert_eq!(closest.index, 1);
//! ```

use centerline_types::{BranchList, CenterlineError, CenterlineResult, ClosestPoint};
use nalgebra::Point3;

/// Finds the branch point closest to `target`.
///
/// Branches are scanned in creation order and points in index order. A point
/// only replaces the current best if it is strictly closer, so the first
/// point encountered wins ties.
///
/// # Errors
///
/// - [`CenterlineError::EmptyBranchList`] if `list` has no branches.
/// - [`CenterlineError::InvalidTarget`] if `target` has a non-finite
///   coordinate.
pub fn find_closest_point_in_branches(
    list: &BranchList,
    target: &Point3<f64>,
) -> CenterlineResult<ClosestPoint> {
    if list.is_empty() {
        return Err(CenterlineError::EmptyBranchList);
    }
    check_target(target)?;

    let mut best: Option<ClosestPoint> = None;

    for (id, branch) in list.iter() {
        for (index, position) in branch.positions().iter().enumerate() {
            let distance = nalgebra::distance(position, target);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(ClosestPoint::new(id, index, *position, distance));
            }
        }
    }

    best.ok_or(CenterlineError::EmptyBranchList)
}

/// Rejects coordinates that cannot be compared by distance.
pub(crate) fn check_target(target: &Point3<f64>) -> CenterlineResult<()> {
    if target.coords.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(CenterlineError::InvalidTarget(format!(
            "target ({}, {}, {}) is not finite",
            target.x, target.y, target.z
        )))
    }
}

//! End-to-end route scenarios.
//!
//! Run with: cargo test -p centerline-route --test route_scenarios

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use centerline_route::RouteToTarget;
use centerline_types::{
    Branch, BranchId, BranchList, CenterlineError, CenterlinePointSet, ParentLink,
};
use nalgebra::Point3;

// =============================================================================
// Fixtures
// =============================================================================

fn colinear(n: usize) -> Vec<Point3<f64>> {
    (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect()
}

/// Branch A: 5 points along x. Branch B: 3 points along y, attached at A[4].
fn two_branch_points() -> (Vec<Point3<f64>>, Vec<u32>) {
    let mut points = colinear(5);
    points.extend((1..=3).map(|i| Point3::new(4.0, i as f64, 0.0)));
    (points, vec![0, 0, 0, 0, 0, 1, 1, 1])
}

fn a(i: usize) -> Point3<f64> {
    Point3::new(i as f64, 0.0, 0.0)
}

fn b(i: usize) -> Point3<f64> {
    Point3::new(4.0, (i + 1) as f64, 0.0)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn single_branch_route_to_index_seven() {
    let mut planner = RouteToTarget::new();
    planner
        .set_centerline(&CenterlinePointSet::from_points(colinear(10)))
        .unwrap();

    let route = planner.find_route_to_target(&a(7)).unwrap();

    let expected: Vec<_> = (0..=7).rev().map(a).collect();
    assert_eq!(route.positions(), expected.as_slice());

    let display: Vec<_> = (0..=7).map(a).collect();
    assert_eq!(route.reversed(), display);
    assert_eq!(planner.route_polyline().unwrap().points(), display.as_slice());
}

#[test]
fn two_branch_route_from_child_tip() {
    let (points, ids) = two_branch_points();
    let mut planner = RouteToTarget::new();
    let list = planner
        .set_centerline(&CenterlinePointSet::with_branch_ids(points, ids).unwrap())
        .unwrap();
    assert_eq!(
        list.get(BranchId::new(1)).unwrap().parent(),
        Some(ParentLink::new(BranchId::new(0), 4))
    );

    let route = planner.find_route_to_target(&b(2)).unwrap();

    let expected = vec![b(2), b(1), b(0), a(4), a(3), a(2), a(1), a(0)];
    assert_eq!(route.positions(), expected.as_slice());
    assert_eq!(route.branches(), &[BranchId::new(1), BranchId::new(0)]);
}

#[test]
fn two_branch_route_from_explicit_edges() {
    let (points, _) = two_branch_points();
    let edges = vec![[0, 1], [1, 2], [2, 3], [3, 4], [4, 5], [5, 6], [6, 7]];
    let mut planner = RouteToTarget::new();
    planner
        .set_centerline(&CenterlinePointSet::with_edges(points, edges).unwrap())
        .unwrap();

    let route = planner.find_route_to_target(&b(2)).unwrap();

    let expected = vec![b(2), b(1), b(0), a(4), a(3), a(2), a(1), a(0)];
    assert_eq!(route.positions(), expected.as_slice());
}

#[test]
fn hand_built_two_branch_list() {
    let mut list = BranchList::new();
    let root = list.push_branch(Branch::new(colinear(5)), None).unwrap();
    let child = list
        .push_branch(
            Branch::new((0..3).map(b).collect()),
            Some(ParentLink::new(root, 4)),
        )
        .unwrap();

    let search = centerline_route::search_branch_up(&list, child, 2).unwrap();
    let expected = vec![b(2), b(1), b(0), a(4), a(3), a(2), a(1), a(0)];
    assert_eq!(search.positions(), expected.as_slice());
}

#[test]
fn query_before_set_centerline() {
    let mut planner = RouteToTarget::new();
    let err = planner.find_route_to_target(&a(0)).unwrap_err();
    assert_eq!(err, CenterlineError::EmptyBranchList);
}

#[test]
fn repeated_queries_are_identical() {
    let (points, ids) = two_branch_points();
    let mut planner = RouteToTarget::new();
    planner
        .set_centerline(&CenterlinePointSet::with_branch_ids(points, ids).unwrap())
        .unwrap();

    let target = Point3::new(3.7, 1.6, 0.4);
    let first = planner.find_route_to_target(&target).unwrap().clone();
    let second = planner.find_route_to_target(&target).unwrap().clone();
    assert_eq!(first, second);
}

#[test]
fn route_length_follows_branches() {
    let (points, ids) = two_branch_points();
    let mut planner = RouteToTarget::new();
    planner
        .set_centerline(&CenterlinePointSet::with_branch_ids(points, ids).unwrap())
        .unwrap();

    let route = planner.find_route_to_target(&b(2)).unwrap();
    // 3 unit steps along B (including the step into A[4]) + 4 along A.
    assert!((route.length() - 7.0).abs() < 1e-12);
}

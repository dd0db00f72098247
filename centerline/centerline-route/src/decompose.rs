//! Branch decomposition of a raw centerline.
//!
//! Turns a [`CenterlinePointSet`] into a [`BranchList`]:
//!
//! - **Graph topologies** (sequential polylines and explicit edges) are
//!   rooted at [`DecompositionConfig::root_index`]. Walking down from the
//!   root, each bifurcation keeps one child in the current branch and opens a
//!   new branch for every other child, attached at the bifurcation point.
//! - **Tagged points** start a new branch wherever the tag changes, so every
//!   run of equal tags is one branch. Each non-root branch attaches to the
//!   closest point of a branch created before it.
//!
//! # Example
//!
//! ```
//! use centerline_route::decompose::decompose;
//! use centerline_types::{CenterlinePointSet, DecompositionConfig};
//! use nalgebra::Point3;
//!
//! // A "Y": trunk 0-1-2, arms 2-3 and 2-4-5.
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(0.0, 0.0, 2.0),
//!     Point3::new(1.0, 0.0, 3.0),
//!     Point3::new(-1.0, 0.0, 3.0),
//!     Point3::new(-2.0, 0.0, 4.0),
//! ];
//! let edges = vec![[0, 1], [1, 2], [2, 3], [2, 4], [4, 5]];
//! let centerline = CenterlinePointSet::with_edges(points, edges).unwrap();
//!
//! let list = decompose(&centerline, &DecompositionConfig::default()).unwrap();
//!
//! // One bifurcation, two branches: the longer arm continues the trunk.
//! assert_eq!(list.len(), 2);
//! assert_eq!(list.branches()[0].source_indices(), &[0, 1, 2, 4, 5]);
//! assert_eq!(list.branches()[1].source_indices(), &[3]);
//! ```

use std::collections::VecDeque;
use std::ops::Range;

use centerline_types::{
    Branch, BranchId, BranchList, CenterlineError, CenterlineResult, CenterlinePointSet,
    ContinuationRule, DecompositionConfig, ParentLink, Topology,
};
use nalgebra::Point3;
use tracing::{debug, info};

use crate::adjacency::{CenterlineGraph, RootedTree};
use crate::nearest::find_closest_point_in_branches;

/// Decomposes a centerline into a tree of branches.
///
/// The returned list has passed [`BranchList::validate_topology`] and
/// [`BranchList::validate_partition`]: one root, every other branch linked
/// to a parent, and every input point in exactly one branch.
///
/// # Errors
///
/// - [`CenterlineError::MalformedCenterline`] for empty input, cycles,
///   disconnected parts, or gaps above [`DecompositionConfig::max_gap`].
/// - [`CenterlineError::InvalidConfig`] if the configuration is invalid or
///   the root index is not a point.
pub fn decompose(
    centerline: &CenterlinePointSet,
    config: &DecompositionConfig,
) -> CenterlineResult<BranchList> {
    let issues = config.validate();
    if !issues.is_empty() {
        return Err(CenterlineError::invalid_config(issues.join("; ")));
    }

    if centerline.is_empty() {
        return Err(CenterlineError::malformed("centerline has no points"));
    }

    let points = centerline.points();
    let list = match centerline.topology() {
        Topology::Sequential => {
            let graph = CenterlineGraph::sequential(points.len());
            decompose_graph(points, &graph, config)?
        }
        Topology::Edges(edges) => {
            let graph = CenterlineGraph::build(points.len(), edges.iter().copied())?;
            decompose_graph(points, &graph, config)?
        }
        Topology::BranchIds(ids) => decompose_tagged(points, ids, config)?,
    };

    list.validate_topology()?;
    list.validate_partition(points.len())?;

    info!(
        points = points.len(),
        branches = list.len(),
        "Decomposed centerline into branches"
    );

    Ok(list)
}

/// Decomposes a connected, acyclic point graph.
fn decompose_graph(
    points: &[Point3<f64>],
    graph: &CenterlineGraph,
    config: &DecompositionConfig,
) -> CenterlineResult<BranchList> {
    if let Some(max_gap) = config.max_gap() {
        for (a, b) in graph.edges() {
            check_gap(points, a, b, max_gap)?;
        }
    }

    let tree = graph.root_at(config.root_index())?;
    let sizes = tree.subtree_sizes();

    debug!(
        bifurcations = tree.bifurcation_count(),
        root = tree.root(),
        "Splitting centerline at bifurcations"
    );

    let mut list = BranchList::new();
    let mut queue: VecDeque<(usize, Option<ParentLink>)> = VecDeque::from([(tree.root(), None)]);

    while let Some((start, parent)) = queue.pop_front() {
        let id = BranchId::new(list.len());
        let mut positions = Vec::new();
        let mut sources = Vec::new();
        let mut point = start;

        loop {
            positions.push(points[point]);
            sources.push(point);

            let children = tree.children(point);
            let Some(next) = continuation(children, &sizes, config.continuation()) else {
                break;
            };

            let attachment = ParentLink::new(id, positions.len() - 1);
            for &child in children.iter().filter(|&&c| c != next) {
                queue.push_back((child, Some(attachment)));
            }
            point = next;
        }

        list.push_branch(Branch::new(positions).with_source_indices(sources), parent)?;
    }

    debug_assert_eq!(list.len(), tree.bifurcation_count() + 1);

    Ok(list)
}

/// Picks the child that continues the current branch.
fn continuation(children: &[usize], sizes: &[usize], rule: ContinuationRule) -> Option<usize> {
    match rule {
        ContinuationRule::FirstChild => children.first().copied(),
        // max_by keeps the last maximum; reversing the index order makes the
        // lowest index win among equal sizes.
        ContinuationRule::LongestSubtree => children
            .iter()
            .copied()
            .max_by(|&a, &b| sizes[a].cmp(&sizes[b]).then(b.cmp(&a))),
    }
}

/// Decomposes points carrying one branch tag each.
///
/// A branch is a maximal run of consecutive points sharing a tag; a tag that
/// reappears later opens a new branch.
fn decompose_tagged(
    points: &[Point3<f64>],
    ids: &[u32],
    config: &DecompositionConfig,
) -> CenterlineResult<BranchList> {
    if ids.len() != points.len() {
        return Err(CenterlineError::malformed(format!(
            "{} branch ids given for {} points",
            ids.len(),
            points.len()
        )));
    }

    let mut runs: Vec<Range<usize>> = Vec::new();
    let mut start = 0;
    for (index, pair) in ids.windows(2).enumerate() {
        if pair[0] != pair[1] {
            let end = index + 1;
            runs.push(start..end);
            start = end;
        }
    }
    runs.push(start..ids.len());

    debug!(runs = runs.len(), "Splitting tagged centerline at tag transitions");

    let mut list = BranchList::new();

    for run in runs {
        if let Some(max_gap) = config.max_gap() {
            for a in run.start..run.end - 1 {
                check_gap(points, a, a + 1, max_gap)?;
            }
        }

        let positions = points[run.clone()].to_vec();
        let first = positions[0];

        let parent = if list.is_empty() {
            None
        } else {
            let closest = find_closest_point_in_branches(&list, &first)?;
            if let Some(max_gap) = config.max_gap() {
                if closest.distance > max_gap {
                    return Err(CenterlineError::malformed(format!(
                        "disconnected centerline: branch starting at point {} is {:.3} from \
                         the nearest earlier branch (max gap {max_gap})",
                        run.start, closest.distance
                    )));
                }
            }
            Some(ParentLink::new(closest.branch, closest.index))
        };

        list.push_branch(Branch::new(positions).with_source_indices(run.collect()), parent)?;
    }

    Ok(list)
}

/// Fails if points `a` and `b` are further apart than `max_gap`.
fn check_gap(points: &[Point3<f64>], a: usize, b: usize, max_gap: f64) -> CenterlineResult<()> {
    let gap = nalgebra::distance(&points[a], &points[b]);
    if gap > max_gap {
        return Err(CenterlineError::malformed(format!(
            "disconnected centerline: gap of {gap:.3} between points {a} and {b} \
             exceeds {max_gap}"
        )));
    }
    Ok(())
}

/// Returns the rooted tree a graph-connected centerline decomposes along.
///
/// Useful for inspecting bifurcations without building branches.
///
/// # Errors
///
/// Same conditions as [`decompose`] for graph topologies. Tagged point sets
/// have no graph and yield `Ok(None)`.
pub fn rooted_tree(
    centerline: &CenterlinePointSet,
    config: &DecompositionConfig,
) -> CenterlineResult<Option<RootedTree>> {
    if centerline.is_empty() {
        return Err(CenterlineError::malformed("centerline has no points"));
    }

    let graph = match centerline.topology() {
        Topology::Sequential => CenterlineGraph::sequential(centerline.len()),
        Topology::Edges(edges) => CenterlineGraph::build(centerline.len(), edges.iter().copied())?,
        Topology::BranchIds(_) => return Ok(None),
    };

    graph.root_at(config.root_index()).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect()
    }

    /// Trunk 0..=3 along x; at point 3 arms 4-5 (+y) and 6-7-8 (-y).
    fn y_centerline() -> CenterlinePointSet {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
            Point3::new(3.0, 2.0, 0.0),
            Point3::new(3.0, -1.0, 0.0),
            Point3::new(3.0, -2.0, 0.0),
            Point3::new(3.0, -3.0, 0.0),
        ];
        let edges = vec![[0, 1], [1, 2], [2, 3], [3, 4], [4, 5], [3, 6], [6, 7], [7, 8]];
        CenterlinePointSet::with_edges(points, edges).unwrap()
    }

    #[test]
    fn test_no_bifurcation_single_branch() {
        let centerline = CenterlinePointSet::from_points(line(10));
        let list = decompose(&centerline, &DecompositionConfig::default()).unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.branches()[0].len(), 10);
        assert!(list.branches()[0].is_root());
    }

    #[test]
    fn test_single_point() {
        let centerline = CenterlinePointSet::from_points(line(1));
        let list = decompose(&centerline, &DecompositionConfig::default()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.total_points(), 1);
    }

    #[test]
    fn test_empty_is_malformed() {
        let centerline = CenterlinePointSet::from_points(Vec::new());
        let err = decompose(&centerline, &DecompositionConfig::default()).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_longest_subtree_continues() {
        let list = decompose(&y_centerline(), &DecompositionConfig::default()).unwrap();

        assert_eq!(list.len(), 2);
        let trunk = &list.branches()[0];
        let arm = &list.branches()[1];
        assert_eq!(trunk.source_indices(), &[0, 1, 2, 3, 6, 7, 8]);
        assert_eq!(arm.source_indices(), &[4, 5]);
        assert_eq!(arm.parent(), Some(ParentLink::new(BranchId::new(0), 3)));
        assert_eq!(list.children(BranchId::new(0)), &[BranchId::new(1)]);
    }

    #[test]
    fn test_first_child_continues() {
        let config = DecompositionConfig::default().with_continuation(ContinuationRule::FirstChild);
        let list = decompose(&y_centerline(), &config).unwrap();

        assert_eq!(list.branches()[0].source_indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(list.branches()[1].source_indices(), &[6, 7, 8]);
        assert_eq!(
            list.branches()[1].parent(),
            Some(ParentLink::new(BranchId::new(0), 3))
        );
    }

    #[test]
    fn test_equal_subtrees_pick_lowest_index() {
        // Both arms have two points.
        let points = line(7);
        let edges = vec![[0, 1], [1, 2], [2, 3], [3, 4], [2, 5], [5, 6]];
        let centerline = CenterlinePointSet::with_edges(points, edges).unwrap();
        let list = decompose(&centerline, &DecompositionConfig::default()).unwrap();

        assert_eq!(list.branches()[0].source_indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(list.branches()[1].source_indices(), &[5, 6]);
    }

    #[test]
    fn test_root_index_in_the_middle() {
        let config = DecompositionConfig::default().with_root_index(3);
        let list = decompose(&y_centerline(), &config).unwrap();

        // Point 3 has three children: 2 (3 points), 4 (2 points), 6 (3 points).
        assert_eq!(list.len(), 3);
        assert_eq!(list.branches()[0].source_indices(), &[3, 2, 1, 0]);
        assert_eq!(list.branches()[1].source_indices(), &[4, 5]);
        assert_eq!(list.branches()[2].source_indices(), &[6, 7, 8]);
        for branch in &list.branches()[1..] {
            assert_eq!(branch.parent(), Some(ParentLink::new(BranchId::new(0), 0)));
        }
    }

    #[test]
    fn test_breadth_first_ids() {
        // 0-1-2 trunk; 1 splits to 3-4; 3 splits to 5; 2 continues to 6-7.
        let points = line(8);
        let edges = vec![[0, 1], [1, 2], [2, 6], [6, 7], [1, 3], [3, 4], [3, 5]];
        let centerline = CenterlinePointSet::with_edges(points, edges).unwrap();
        let config = DecompositionConfig::default().with_continuation(ContinuationRule::FirstChild);
        let list = decompose(&centerline, &config).unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list.branches()[0].source_indices(), &[0, 1, 2, 6, 7]);
        assert_eq!(list.branches()[1].source_indices(), &[3, 4]);
        assert_eq!(list.branches()[2].source_indices(), &[5]);
        assert_eq!(list.generation(BranchId::new(2)), Some(3));
    }

    #[test]
    fn test_cycle_is_malformed() {
        let centerline =
            CenterlinePointSet::with_edges(line(4), vec![[0, 1], [1, 2], [2, 3], [3, 0]]).unwrap();
        let err = decompose(&centerline, &DecompositionConfig::default()).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_disconnected_is_malformed() {
        let centerline = CenterlinePointSet::with_edges(line(4), vec![[0, 1], [2, 3]]).unwrap();
        let err = decompose(&centerline, &DecompositionConfig::default()).unwrap_err();
        assert!(err.to_string().contains("disconnected"));
    }

    #[test]
    fn test_max_gap_sequential() {
        let mut points = line(4);
        points[3].x = 10.0;
        let centerline = CenterlinePointSet::from_points(points);

        assert!(decompose(&centerline, &DecompositionConfig::default()).is_ok());

        let config = DecompositionConfig::default().with_max_gap(1.5);
        let err = decompose(&centerline, &config).unwrap_err();
        assert!(err.to_string().contains("points 2 and 3"));
    }

    #[test]
    fn test_invalid_config() {
        let centerline = CenterlinePointSet::from_points(line(3));
        let config = DecompositionConfig::default().with_max_gap(-1.0);
        let err = decompose(&centerline, &config).unwrap_err();
        assert!(matches!(err, CenterlineError::InvalidConfig(_)));

        let config = DecompositionConfig::default().with_root_index(3);
        let err = decompose(&centerline, &config).unwrap_err();
        assert!(matches!(err, CenterlineError::InvalidConfig(_)));
    }

    #[test]
    fn test_tagged_two_branches() {
        let mut points = line(5);
        points.extend((1..=3).map(|i| Point3::new(4.0, i as f64, 0.0)));
        let ids = vec![0, 0, 0, 0, 0, 1, 1, 1];
        let centerline = CenterlinePointSet::with_branch_ids(points, ids).unwrap();

        let list = decompose(&centerline, &DecompositionConfig::default()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.branches()[0].len(), 5);
        assert_eq!(list.branches()[1].len(), 3);
        assert_eq!(
            list.branches()[1].parent(),
            Some(ParentLink::new(BranchId::new(0), 4))
        );
    }

    #[test]
    fn test_tagged_repeated_tag_opens_new_branch() {
        let points = [0.0, 1.0, 2.0, 3.0, 50.0, 51.0]
            .iter()
            .map(|&x| Point3::new(x, 0.0, 0.0))
            .collect();
        let ids = vec![0, 0, 1, 1, 0, 0];
        let centerline = CenterlinePointSet::with_branch_ids(points, ids).unwrap();

        let list = decompose(&centerline, &DecompositionConfig::default()).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.branches()[0].source_indices(), &[0, 1]);
        assert_eq!(list.branches()[1].source_indices(), &[2, 3]);
        assert_eq!(list.branches()[2].source_indices(), &[4, 5]);
        assert_eq!(
            list.branches()[1].parent(),
            Some(ParentLink::new(BranchId::new(0), 1))
        );
        // (50, 0, 0) is closest to the end of the second run.
        assert_eq!(
            list.branches()[2].parent(),
            Some(ParentLink::new(BranchId::new(1), 1))
        );
    }

    #[test]
    fn test_tagged_alternating_tags() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 6.0, 0.0),
        ];
        let ids = vec![7, 3, 7, 3];
        let centerline = CenterlinePointSet::with_branch_ids(points, ids).unwrap();

        let list = decompose(&centerline, &DecompositionConfig::default()).unwrap();
        assert_eq!(list.len(), 4);
        assert!(list.iter().all(|(_, branch)| branch.len() == 1));
        assert_eq!(
            list.branches()[1].parent(),
            Some(ParentLink::new(BranchId::new(0), 0))
        );
        // (0, 6, 0) is closest to (0, 5, 0).
        assert_eq!(
            list.branches()[3].parent(),
            Some(ParentLink::new(BranchId::new(1), 0))
        );
    }

    #[test]
    fn test_tagged_length_mismatch_is_malformed() {
        let err = decompose_tagged(&line(2), &[0, 0, 1], &DecompositionConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("3 branch ids given for 2 points"));
    }

    #[test]
    fn test_tagged_attachment_beyond_max_gap() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(9.0, 0.0, 0.0),
        ];
        let centerline = CenterlinePointSet::with_branch_ids(points, vec![0, 0, 1]).unwrap();
        let config = DecompositionConfig::default().with_max_gap(2.0);

        let err = decompose(&centerline, &config).unwrap_err();
        assert!(err.to_string().contains("nearest earlier branch"));
    }

    #[test]
    fn test_rooted_tree_inspection() {
        let tree = rooted_tree(&y_centerline(), &DecompositionConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(tree.bifurcation_count(), 1);
        assert!(tree.is_bifurcation(3));

        let tagged = CenterlinePointSet::with_branch_ids(line(2), vec![0, 1]).unwrap();
        assert!(
            rooted_tree(&tagged, &DecompositionConfig::default())
                .unwrap()
                .is_none()
        );
    }
}

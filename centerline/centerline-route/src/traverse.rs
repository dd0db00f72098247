//! Upstream traversal from a branch point to the tree root.
//!
//! The walk is an explicit state machine held in a [`RouteSearchState`]:
//!
//! ```text
//! TraversingBranch --index reaches 0, parent exists--> AtBifurcation
//! AtBifurcation    --enter parent at attachment-----> TraversingBranch
//! TraversingBranch --index reaches 0, root----------> AtRoot (terminal)
//! ```
//!
//! Each visited point is appended to the accumulated positions, so a finished
//! search holds the root-directed route: start point first, first point of
//! the root branch last.
//!
//! # Example
//!
//! ```
//! use centerline_route::traverse::search_branch_up;
//! use centerline_types::{Branch, BranchList, ParentLink};
//! use nalgebra::Point3;
//!
//! let mut list = BranchList::new();
//! let root = list
//!     .push_branch(
//!         Branch::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]),
//!         None,
//!     )
//!     .unwrap();
//! let child = list
//!     .push_branch(
//!         Branch::new(vec![Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 2.0, 0.0)]),
//!         Some(ParentLink::new(root, 1)),
//!     )
//!     .unwrap();
//!
//! let search = search_branch_up(&list, child, 1).unwrap();
//! assert!(search.is_finished());
//! assert_eq!(search.positions().len(), 4);
//! assert_eq!(search.positions()[3], Point3::new(0.0, 0.0, 0.0));
//! ```

use centerline_types::{BranchId, BranchList, CenterlineError, CenterlineResult, ParentLink};
use nalgebra::Point3;
use tracing::{debug, error};

/// Position of an upstream walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    /// Walking towards index 0 of `branch`; `index` is the next point to
    /// visit.
    TraversingBranch {
        /// Branch being walked.
        branch: BranchId,
        /// Next index to visit.
        index: usize,
    },

    /// The start of a branch has been passed; the walk continues in the
    /// parent named by `link`.
    AtBifurcation {
        /// Where the walk re-enters the parent branch.
        link: ParentLink,
    },

    /// The first point of the root branch has been visited.
    AtRoot,
}

/// Traversal context for one upstream search.
///
/// Created per query and discarded afterwards; it never outlives the search
/// that produced it and is not shared between queries.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSearchState {
    state: TraversalState,
    positions: Vec<Point3<f64>>,
    /// Branches entered, starting with the start branch.
    branches: Vec<BranchId>,
    bifurcations_crossed: usize,
}

impl RouteSearchState {
    /// Creates a search positioned at `start_index` of `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::InvalidIndex`] if the branch does not exist
    /// or `start_index` is outside it.
    pub fn new(list: &BranchList, branch: BranchId, start_index: usize) -> CenterlineResult<Self> {
        let len = list.get(branch).map_or(0, |b| b.len());
        if start_index >= len {
            return Err(CenterlineError::InvalidIndex {
                branch,
                index: start_index,
                len,
            });
        }

        Ok(Self {
            state: TraversalState::TraversingBranch {
                branch,
                index: start_index,
            },
            positions: Vec::new(),
            branches: vec![branch],
            bifurcations_crossed: 0,
        })
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> TraversalState {
        self.state
    }

    /// Returns the positions visited so far, in visiting order.
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Returns the branches entered so far.
    #[must_use]
    pub fn branches(&self) -> &[BranchId] {
        &self.branches
    }

    /// Returns `true` once the root has been reached.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, TraversalState::AtRoot)
    }

    /// Advances the walk by one transition and returns the new state.
    ///
    /// Stepping a finished search is a no-op.
    ///
    /// # Errors
    ///
    /// - [`CenterlineError::BrokenBranchTopology`] if a branch without parent
    ///   is not the root, or the parent chain does not terminate.
    /// - [`CenterlineError::InvalidIndex`] if a branch or point referenced by
    ///   the walk does not exist.
    pub fn step(&mut self, list: &BranchList) -> CenterlineResult<TraversalState> {
        match self.state {
            TraversalState::TraversingBranch { branch, index } => {
                let current = list.get(branch).ok_or(CenterlineError::InvalidIndex {
                    branch,
                    index,
                    len: 0,
                })?;
                let position = current
                    .position(index)
                    .ok_or(CenterlineError::InvalidIndex {
                        branch,
                        index,
                        len: current.len(),
                    })?;
                self.positions.push(*position);

                self.state = if index > 0 {
                    TraversalState::TraversingBranch {
                        branch,
                        index: index - 1,
                    }
                } else if let Some(link) = current.parent() {
                    TraversalState::AtBifurcation { link }
                } else if current.is_root() {
                    TraversalState::AtRoot
                } else {
                    error!(%branch, "Branch has no parent but is not the root");
                    return Err(CenterlineError::broken_topology(
                        branch,
                        "branch has no parent but is not the root",
                    ));
                };
            }
            TraversalState::AtBifurcation { link } => {
                self.bifurcations_crossed += 1;
                if self.bifurcations_crossed >= list.len() {
                    error!(
                        branch = %link.branch,
                        crossed = self.bifurcations_crossed,
                        "Parent chain does not terminate at the root"
                    );
                    return Err(CenterlineError::broken_topology(
                        link.branch,
                        format!(
                            "parent chain crossed {} bifurcations in a list of {} branches",
                            self.bifurcations_crossed,
                            list.len()
                        ),
                    ));
                }

                debug!(
                    parent = %link.branch,
                    attachment = link.attachment_index,
                    "Entering parent branch"
                );
                self.branches.push(link.branch);
                self.state = TraversalState::TraversingBranch {
                    branch: link.branch,
                    index: link.attachment_index,
                };
            }
            TraversalState::AtRoot => {}
        }

        Ok(self.state)
    }

    /// Steps until the root is reached.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`Self::step`].
    pub fn run(mut self, list: &BranchList) -> CenterlineResult<Self> {
        while !self.is_finished() {
            self.step(list)?;
        }
        Ok(self)
    }

    /// Consumes the search, returning the visited positions and branches.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<BranchId>) {
        (self.positions, self.branches)
    }
}

/// Walks from `start_index` of `branch` up to the first point of the root
/// branch, collecting every visited position.
///
/// # Errors
///
/// See [`RouteSearchState::new`] and [`RouteSearchState::step`].
pub fn search_branch_up(
    list: &BranchList,
    branch: BranchId,
    start_index: usize,
) -> CenterlineResult<RouteSearchState> {
    RouteSearchState::new(list, branch, start_index)?.run(list)
}

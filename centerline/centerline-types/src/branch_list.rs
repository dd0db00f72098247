//! The branch tree of one processed centerline.
//!
//! [`BranchList`] is a flat arena: branches are stored in creation order and
//! refer to each other through [`BranchId`] indices. A parent must already be
//! in the list when a child is pushed, which keeps the parent graph acyclic.
//!
//! # Example
//!
//! ```
//! use centerline_types::{Branch, BranchList, ParentLink};
//! use nalgebra::Point3;
//!
//! let mut list = BranchList::new();
//! let trunk = list
//!     .push_branch(
//!         Branch::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0)]),
//!         None,
//!     )
//!     .unwrap();
//! let arm = list
//!     .push_branch(
//!         Branch::new(vec![Point3::new(1.0, 0.0, 1.0)]),
//!         Some(ParentLink::new(trunk, 1)),
//!     )
//!     .unwrap();
//!
//! assert_eq!(list.root(), Some(trunk));
//! assert_eq!(list.generation(arm), Some(2));
//! assert!(list.validate_topology().is_ok());
//! ```

use crate::branch::{Branch, BranchId, ParentLink};
use crate::error::{CenterlineError, CenterlineResult};

/// Arena of branches forming a tree.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchList {
    branches: Vec<Branch>,
    root: Option<BranchId>,
}

impl BranchList {
    /// Creates an empty branch list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            branches: Vec::new(),
            root: None,
        }
    }

    /// Appends a branch and links it to its parent.
    ///
    /// The first branch pushed without a parent becomes the root. Later
    /// parentless branches are stored unflagged; [`Self::validate_topology`]
    /// reports them.
    ///
    /// # Errors
    ///
    /// - [`CenterlineError::MalformedCenterline`] if the branch has no positions.
    /// - [`CenterlineError::BrokenBranchTopology`] if the parent does not exist
    ///   or the attachment index is outside the parent.
    pub fn push_branch(
        &mut self,
        mut branch: Branch,
        parent: Option<ParentLink>,
    ) -> CenterlineResult<BranchId> {
        let id = BranchId::new(self.branches.len());

        if branch.is_empty() {
            return Err(CenterlineError::malformed(format!(
                "branch {id} has no positions"
            )));
        }

        if let Some(link) = parent {
            let parent_branch = self.branches.get(link.branch.index()).ok_or_else(|| {
                CenterlineError::broken_topology(
                    id,
                    format!("parent branch {} does not exist", link.branch),
                )
            })?;
            if link.attachment_index >= parent_branch.len() {
                return Err(CenterlineError::broken_topology(
                    id,
                    format!(
                        "attachment index {} is outside parent branch {} (len {})",
                        link.attachment_index,
                        link.branch,
                        parent_branch.len()
                    ),
                ));
            }
        }

        branch.set_parent(parent);
        branch.clear_children();
        branch.set_root(parent.is_none() && self.root.is_none());
        if branch.is_root() {
            self.root = Some(id);
        }

        if let Some(link) = parent {
            self.branches[link.branch.index()].push_child(id);
        }
        self.branches.push(branch);

        Ok(id)
    }

    /// Returns the number of branches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Returns `true` if no branches have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Returns the branch with the given id.
    #[must_use]
    pub fn get(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.index())
    }

    /// Returns the root branch id.
    #[must_use]
    pub const fn root(&self) -> Option<BranchId> {
        self.root
    }

    /// Returns the branches in creation order.
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Iterates over `(id, branch)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (BranchId, &Branch)> {
        self.branches
            .iter()
            .enumerate()
            .map(|(i, b)| (BranchId::new(i), b))
    }

    /// Returns the children of a branch, or an empty slice for unknown ids.
    #[must_use]
    pub fn children(&self, id: BranchId) -> &[BranchId] {
        self.get(id).map_or(&[], Branch::children)
    }

    /// Returns the generation of a branch: 1 for the root, 2 for its
    /// children, and so on.
    ///
    /// Returns `None` for unknown ids and for branches whose parent chain does
    /// not reach the root.
    #[must_use]
    pub fn generation(&self, id: BranchId) -> Option<usize> {
        let mut current = self.get(id)?;
        let mut generation = 1;

        while let Some(link) = current.parent() {
            current = self.get(link.branch)?;
            generation += 1;
            if generation > self.branches.len() {
                return None;
            }
        }

        current.is_root().then_some(generation)
    }

    /// Returns the total number of positions over all branches.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.branches.iter().map(Branch::len).sum()
    }

    /// Checks that there is exactly one root and every other branch has a
    /// parent.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::EmptyBranchList`] for an empty list and
    /// [`CenterlineError::BrokenBranchTopology`] for the first offending
    /// branch.
    pub fn validate_topology(&self) -> CenterlineResult<()> {
        let root = self.root.ok_or(CenterlineError::EmptyBranchList)?;

        for (id, branch) in self.iter() {
            if branch.parent().is_none() && id != root {
                return Err(CenterlineError::broken_topology(
                    id,
                    "branch has no parent but is not the root",
                ));
            }
        }

        Ok(())
    }

    /// Checks that every input point index in `0..point_count` belongs to
    /// exactly one branch.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::MalformedCenterline`] naming the first point
    /// that is missing, duplicated or out of range.
    pub fn validate_partition(&self, point_count: usize) -> CenterlineResult<()> {
        let mut owner: Vec<Option<BranchId>> = vec![None; point_count];

        for (id, branch) in self.iter() {
            for &source in branch.source_indices() {
                let slot = owner.get_mut(source).ok_or_else(|| {
                    CenterlineError::malformed(format!(
                        "branch {id} refers to point {source} outside 0..{point_count}"
                    ))
                })?;
                if let Some(other) = slot {
                    return Err(CenterlineError::malformed(format!(
                        "point {source} belongs to branches {other} and {id}"
                    )));
                }
                *slot = Some(id);
            }
        }

        if let Some(missing) = owner.iter().position(Option::is_none) {
            return Err(CenterlineError::malformed(format!(
                "point {missing} belongs to no branch"
            )));
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a BranchList {
    type Item = &'a Branch;
    type IntoIter = std::slice::Iter<'a, Branch>;

    fn into_iter(self) -> Self::IntoIter {
        self.branches.iter()
    }
}

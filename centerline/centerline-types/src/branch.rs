//! Branches of a centerline tree.
//!
//! A [`Branch`] is a maximal run of centerline points between two
//! bifurcations, or between a bifurcation and an end point. Branches live in
//! a [`BranchList`](crate::BranchList) arena and refer to each other by
//! [`BranchId`].

use std::fmt;
use std::ops::Range;

use nalgebra::Point3;

/// Index of a branch within its [`BranchList`](crate::BranchList).
///
/// Ids follow creation order, so the root branch is normally `BranchId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchId(usize);

impl BranchId {
    /// Creates a branch id from a raw arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a branch joins its parent.
///
/// Walking upstream, the point after a branch's first point is
/// `parent.position(attachment_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentLink {
    /// The parent branch.
    pub branch: BranchId,
    /// Index of the bifurcation point within the parent branch.
    pub attachment_index: usize,
}

impl ParentLink {
    /// Creates a new parent link.
    #[must_use]
    pub const fn new(branch: BranchId, attachment_index: usize) -> Self {
        Self {
            branch,
            attachment_index,
        }
    }
}

/// An ordered run of centerline positions belonging to one tree segment.
///
/// Index 0 is the upstream end (closest to the root). Parent and child links
/// are set when the branch is pushed into a [`BranchList`](crate::BranchList).
///
/// # Example
///
/// ```
/// use centerline_types::Branch;
/// use nalgebra::Point3;
///
/// let branch = Branch::new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ]);
///
/// assert_eq!(branch.len(), 2);
/// assert_eq!(branch.index_range(), 0..2);
/// assert!(branch.parent().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Branch {
    positions: Vec<Point3<f64>>,
    /// Index of each position in the ingested point set.
    source_indices: Vec<usize>,
    parent: Option<ParentLink>,
    children: Vec<BranchId>,
    is_root: bool,
}

impl Branch {
    /// Creates an unlinked branch from ordered positions.
    #[must_use]
    pub const fn new(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            source_indices: Vec::new(),
            parent: None,
            children: Vec::new(),
            is_root: false,
        }
    }

    /// Records which input point each position came from.
    #[must_use]
    pub fn with_source_indices(mut self, source_indices: Vec<usize>) -> Self {
        self.source_indices = source_indices;
        self
    }

    /// Returns the positions, upstream end first.
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Returns the position at the given index.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<&Point3<f64>> {
        self.positions.get(index)
    }

    /// Returns the upstream end of the branch.
    #[must_use]
    pub fn first(&self) -> Option<&Point3<f64>> {
        self.positions.first()
    }

    /// Returns the downstream end of the branch.
    #[must_use]
    pub fn last(&self) -> Option<&Point3<f64>> {
        self.positions.last()
    }

    /// Returns the input point indices, parallel to [`Self::positions`].
    ///
    /// Empty for branches built by hand without source information.
    #[must_use]
    pub fn source_indices(&self) -> &[usize] {
        &self.source_indices
    }

    /// Returns the number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the branch has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the valid index range into this branch's positions.
    #[must_use]
    pub fn index_range(&self) -> Range<usize> {
        0..self.positions.len()
    }

    /// Returns the link to the parent branch, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    /// Returns the ids of the child branches in creation order.
    #[must_use]
    pub fn children(&self) -> &[BranchId] {
        &self.children
    }

    /// Returns `true` if this branch is the root of its list.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_root
    }

    /// Returns the arc length along the branch.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.positions
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    pub(crate) const fn set_parent(&mut self, parent: Option<ParentLink>) {
        self.parent = parent;
    }

    pub(crate) const fn set_root(&mut self, is_root: bool) {
        self.is_root = is_root;
    }

    pub(crate) fn push_child(&mut self, child: BranchId) {
        self.children.push(child);
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }
}

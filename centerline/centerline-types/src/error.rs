//! Error types for centerline operations.
//!
//! This module defines the [`CenterlineError`] enum which covers every failure
//! of centerline ingestion, branch decomposition and route extraction.

use thiserror::Error;

use crate::branch::BranchId;

/// Result type for centerline operations.
pub type CenterlineResult<T> = Result<T, CenterlineError>;

/// Errors that can occur while building branch trees or extracting routes.
///
/// # Example
///
/// ```
/// use centerline_types::CenterlineError;
///
/// let error = CenterlineError::malformed("points 4 and 9 are not connected");
/// assert!(error.is_malformed());
/// assert!(error.to_string().contains("malformed centerline"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CenterlineError {
    /// The input cannot be turned into a valid branch tree.
    ///
    /// Raised for empty input, invalid edge indices, disconnected parts and
    /// cycles.
    #[error("malformed centerline: {0}")]
    MalformedCenterline(String),

    /// A query was made before any centerline was set.
    #[error("branch list is empty: no centerline has been set")]
    EmptyBranchList,

    /// The parent chain does not terminate at the flagged root.
    ///
    /// This is an internal invariant violation and indicates a defect in
    /// branch construction.
    #[error("broken branch topology at branch {branch}: {reason}")]
    BrokenBranchTopology {
        /// The branch where the violation was detected.
        branch: BranchId,
        /// Description of the violation.
        reason: String,
    },

    /// A branch id or point index does not exist.
    #[error("index {index} is out of range for branch {branch} (len {len})")]
    InvalidIndex {
        /// The branch that was addressed.
        branch: BranchId,
        /// The offending index.
        index: usize,
        /// Number of points in the branch (0 if the branch does not exist).
        len: usize,
    },

    /// The query coordinate cannot be used (for example it is not finite).
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// An invalid configuration parameter was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CenterlineError {
    /// Creates a malformed centerline error with the given message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCenterline(message.into())
    }

    /// Creates a broken topology error for the given branch.
    #[must_use]
    pub fn broken_topology(branch: BranchId, reason: impl Into<String>) -> Self {
        Self::BrokenBranchTopology {
            branch,
            reason: reason.into(),
        }
    }

    /// Creates an invalid configuration error with the given message.
    ///
    /// # Example
    ///
    /// ```
    /// use centerline_types::CenterlineError;
    ///
    /// let error = CenterlineError::invalid_config("extension step must be positive");
    /// assert!(error.to_string().contains("extension step"));
    /// ```
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns `true` if this is a malformed centerline error.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedCenterline(_))
    }

    /// Returns `true` if no centerline had been set.
    #[must_use]
    pub const fn is_empty_branch_list(&self) -> bool {
        matches!(self, Self::EmptyBranchList)
    }

    /// Returns `true` if this is an internal topology violation.
    #[must_use]
    pub const fn is_broken_topology(&self) -> bool {
        matches!(self, Self::BrokenBranchTopology { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let error = CenterlineError::malformed("cycle through point 3");
        let msg = error.to_string();
        assert!(msg.contains("malformed centerline"));
        assert!(msg.contains("cycle through point 3"));
    }

    #[test]
    fn test_empty_branch_list_display() {
        let error = CenterlineError::EmptyBranchList;
        assert!(error.to_string().contains("no centerline"));
        assert!(error.is_empty_branch_list());
        assert!(!error.is_malformed());
    }

    #[test]
    fn test_broken_topology_display() {
        let error = CenterlineError::broken_topology(BranchId::new(3), "no parent");
        let msg = error.to_string();
        assert!(msg.contains("branch 3"));
        assert!(msg.contains("no parent"));
        assert!(error.is_broken_topology());
    }

    #[test]
    fn test_invalid_index_display() {
        let error = CenterlineError::InvalidIndex {
            branch: BranchId::new(1),
            index: 12,
            len: 5,
        };
        let msg = error.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("len 5"));
    }

    #[test]
    fn test_invalid_target_display() {
        let error = CenterlineError::InvalidTarget("coordinate is NaN".to_string());
        assert!(error.to_string().contains("invalid target"));
    }

    #[test]
    fn test_invalid_config_helper() {
        let error = CenterlineError::invalid_config("negative gap");
        assert!(matches!(error, CenterlineError::InvalidConfig(msg) if msg == "negative gap"));
    }
}

//! Configuration for branch decomposition and route extraction.
//!
//! # Example
//!
//! ```
//! use centerline_types::{ContinuationRule, DecompositionConfig, RouteConfig, RouteToTargetConfig};
//!
//! let config = RouteToTargetConfig::default()
//!     .with_decomposition(
//!         DecompositionConfig::default()
//!             .with_continuation(ContinuationRule::FirstChild)
//!             .with_max_gap(2.5),
//!     )
//!     .with_route(RouteConfig::default().with_extend_to_target(true));
//!
//! assert!(config.validate().is_empty());
//! ```

/// Which child continues the current branch at a bifurcation.
///
/// The remaining children each start a new branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContinuationRule {
    /// The child with the most downstream points continues the branch.
    ///
    /// Keeps the main airway or vessel in one long branch. Ties go to the
    /// child with the lowest point index.
    #[default]
    LongestSubtree,

    /// The child with the lowest point index continues the branch.
    FirstChild,
}

/// Configuration for turning a centerline point set into a branch tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecompositionConfig {
    /// Input point that becomes the start of the root branch.
    ///
    /// Only used for graph topologies; with branch tags the root is the
    /// branch holding the first point.
    root_index: usize,
    /// Rule for continuing a branch through a bifurcation.
    continuation: ContinuationRule,
    /// Longest allowed distance between connected points.
    max_gap: Option<f64>,
}

impl DecompositionConfig {
    /// Creates a configuration with default settings.
    ///
    /// Defaults:
    /// - Root index: 0
    /// - Continuation: longest subtree
    /// - No gap limit
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root_index: 0,
            continuation: ContinuationRule::LongestSubtree,
            max_gap: None,
        }
    }

    /// Sets the input point the root branch starts at.
    #[must_use]
    pub const fn with_root_index(mut self, root_index: usize) -> Self {
        self.root_index = root_index;
        self
    }

    /// Sets the continuation rule.
    #[must_use]
    pub const fn with_continuation(mut self, continuation: ContinuationRule) -> Self {
        self.continuation = continuation;
        self
    }

    /// Sets the longest allowed distance between connected points.
    ///
    /// Longer edges, and longer branch attachments, are reported as
    /// disconnections.
    #[must_use]
    pub const fn with_max_gap(mut self, max_gap: f64) -> Self {
        self.max_gap = Some(max_gap);
        self
    }

    /// Removes the gap limit.
    #[must_use]
    pub const fn without_max_gap(mut self) -> Self {
        self.max_gap = None;
        self
    }

    /// Returns the root point index.
    #[must_use]
    pub const fn root_index(&self) -> usize {
        self.root_index
    }

    /// Returns the continuation rule.
    #[must_use]
    pub const fn continuation(&self) -> ContinuationRule {
        self.continuation
    }

    /// Returns the gap limit, if set.
    #[must_use]
    pub const fn max_gap(&self) -> Option<f64> {
        self.max_gap
    }

    /// Validates the configuration and returns any issues.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(gap) = self.max_gap {
            if !gap.is_finite() || gap <= 0.0 {
                issues.push(format!("max_gap must be positive and finite, got {gap}"));
            }
        }

        issues
    }
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the route output.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteConfig {
    /// Whether to continue the route in a straight line from the projected
    /// centerline point to the target.
    extend_to_target: bool,
    /// Spacing between extension points, in world units (mm).
    extension_step: f64,
}

impl RouteConfig {
    /// Smallest accepted spacing between extension points.
    pub const MIN_EXTENSION_STEP: f64 = 1e-3;

    /// Creates a configuration with default settings.
    ///
    /// Defaults:
    /// - No extension to target
    /// - Extension step: 0.5
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extend_to_target: false,
            extension_step: 0.5,
        }
    }

    /// Sets whether the route is extended to the target.
    #[must_use]
    pub const fn with_extend_to_target(mut self, extend: bool) -> Self {
        self.extend_to_target = extend;
        self
    }

    /// Sets the spacing between extension points.
    #[must_use]
    pub const fn with_extension_step(mut self, step: f64) -> Self {
        self.extension_step = step;
        self
    }

    /// Returns whether the route is extended to the target.
    #[must_use]
    pub const fn extend_to_target(&self) -> bool {
        self.extend_to_target
    }

    /// Returns the spacing between extension points.
    #[must_use]
    pub const fn extension_step(&self) -> f64 {
        self.extension_step
    }

    /// Validates the configuration and returns any issues.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.extension_step.is_finite() || self.extension_step < Self::MIN_EXTENSION_STEP {
            issues.push(format!(
                "extension_step must be finite and at least {}, got {}",
                Self::MIN_EXTENSION_STEP,
                self.extension_step
            ));
        }

        issues
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Combined configuration for a route-to-target planner.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteToTargetConfig {
    decomposition: DecompositionConfig,
    route: RouteConfig,
}

impl RouteToTargetConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            decomposition: DecompositionConfig::new(),
            route: RouteConfig::new(),
        }
    }

    /// Sets the decomposition configuration.
    #[must_use]
    pub const fn with_decomposition(mut self, decomposition: DecompositionConfig) -> Self {
        self.decomposition = decomposition;
        self
    }

    /// Sets the route configuration.
    #[must_use]
    pub const fn with_route(mut self, route: RouteConfig) -> Self {
        self.route = route;
        self
    }

    /// Returns the decomposition configuration.
    #[must_use]
    pub const fn decomposition(&self) -> &DecompositionConfig {
        &self.decomposition
    }

    /// Returns the route configuration.
    #[must_use]
    pub const fn route(&self) -> &RouteConfig {
        &self.route
    }

    /// Validates both parts and returns all issues.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.decomposition.validate();
        issues.extend(self.route.validate());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposition_defaults() {
        let config = DecompositionConfig::default();
        assert_eq!(config.root_index(), 0);
        assert_eq!(config.continuation(), ContinuationRule::LongestSubtree);
        assert_eq!(config.max_gap(), None);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_decomposition_builder() {
        let config = DecompositionConfig::new()
            .with_root_index(4)
            .with_continuation(ContinuationRule::FirstChild)
            .with_max_gap(1.5);
        assert_eq!(config.root_index(), 4);
        assert_eq!(config.continuation(), ContinuationRule::FirstChild);
        assert_eq!(config.max_gap(), Some(1.5));
        assert_eq!(config.without_max_gap().max_gap(), None);
    }

    #[test]
    fn test_decomposition_rejects_bad_gap() {
        assert_eq!(DecompositionConfig::new().with_max_gap(0.0).validate().len(), 1);
        assert_eq!(
            DecompositionConfig::new().with_max_gap(f64::NAN).validate().len(),
            1
        );
    }

    #[test]
    fn test_route_config() {
        let config = RouteConfig::default();
        assert!(!config.extend_to_target());
        assert!((config.extension_step() - 0.5).abs() < 1e-12);

        let config = config.with_extend_to_target(true).with_extension_step(-1.0);
        assert!(config.extend_to_target());
        assert!(config.validate()[0].contains("extension_step"));
    }

    #[test]
    fn test_route_config_rejects_degenerate_step() {
        let config = RouteConfig::new().with_extension_step(1e-12);
        assert_eq!(config.validate().len(), 1);

        let config = RouteConfig::new().with_extension_step(RouteConfig::MIN_EXTENSION_STEP);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_combined_validate_collects_all() {
        let config = RouteToTargetConfig::new()
            .with_decomposition(DecompositionConfig::new().with_max_gap(-2.0))
            .with_route(RouteConfig::new().with_extension_step(0.0));
        assert_eq!(config.validate().len(), 2);
    }
}

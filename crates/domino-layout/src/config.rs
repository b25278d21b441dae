#![forbid(unsafe_code)]

//! Tunables for block composition.

/// Configuration shared by every block of a [`crate::Domino`].
#[derive(Debug, Clone, PartialEq)]
pub struct DominoConfig {
    /// Gap inserted next to a node when it is detached.
    pub detached_offset: f32,
    /// Initial stratification flag of a new chain.
    pub stratify_new_chains: bool,
    /// Stratify a single-node block by its node when the node carries more
    /// than one group on an axis.
    pub auto_stratify: bool,
    /// Outline walk gives up after `outline_step_factor * nodes + 8` steps.
    pub outline_step_factor: usize,
    /// Smallest extent a node may be zoomed down to.
    pub min_node_extent: f32,
}

impl Default for DominoConfig {
    fn default() -> Self {
        Self {
            detached_offset: 50.0,
            stratify_new_chains: true,
            auto_stratify: true,
            outline_step_factor: 8,
            min_node_extent: 10.0,
        }
    }
}

impl DominoConfig {
    /// Override the detached gap.
    #[must_use]
    pub fn with_detached_offset(mut self, offset: f32) -> Self {
        self.detached_offset = offset;
        self
    }

    #[must_use]
    pub fn with_stratify_new_chains(mut self, stratify: bool) -> Self {
        self.stratify_new_chains = stratify;
        self
    }

    #[must_use]
    pub fn with_auto_stratify(mut self, enabled: bool) -> Self {
        self.auto_stratify = enabled;
        self
    }

    #[must_use]
    pub fn with_outline_step_factor(mut self, factor: usize) -> Self {
        self.outline_step_factor = factor;
        self
    }

    #[must_use]
    pub fn with_min_node_extent(mut self, extent: f32) -> Self {
        self.min_node_extent = extent;
        self
    }

    /// Step bound for outline tracing over `nodes` nodes.
    pub fn outline_step_limit(&self, nodes: usize) -> usize {
        self.outline_step_factor.saturating_mul(nodes).saturating_add(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_builders() {
        let config = DominoConfig::default();
        assert_eq!(config.detached_offset, 50.0);
        assert!(config.stratify_new_chains);
        assert_eq!(config.outline_step_limit(3), 32);

        let config = config
            .with_detached_offset(20.0)
            .with_auto_stratify(false)
            .with_outline_step_factor(2);
        assert_eq!(config.detached_offset, 20.0);
        assert!(!config.auto_stratify);
        assert_eq!(config.outline_step_limit(5), 18);
    }
}

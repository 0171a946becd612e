//! Workflow configuration.

/// Configuration for the workflow services.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Maximum number of entries a review queue query returns
    /// (default: 200).
    pub review_page_size: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            review_page_size: 200,
        }
    }
}

use help_layer_protocol::SharedStr;
use thiserror::Error;

/// Fatal overlay failure. The frame loop is already cancelled by the time
/// the host sees one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("selector not found: {selector}")]
    UnresolvedSelector { selector: SharedStr, scene: u32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid tour file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("step {index} has an empty selector")]
    EmptySelector { index: usize },
    #[error("padding must be a finite, non-negative number (got {0})")]
    InvalidPadding(f64),
}

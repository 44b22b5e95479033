use thiserror::Error;

use crate::presentation::PresentationState;

/// Errors reported synchronously by alert configuration and lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    /// A text field was read at an index that was never registered.
    #[error("no text field at index {index} (alert has {count} fields)")]
    FieldOutOfRange { index: usize, count: usize },

    /// A button was activated at an index that was never registered.
    #[error("no button at index {index} (alert has {count} buttons)")]
    ButtonOutOfRange { index: usize, count: usize },

    /// A lifecycle or configuration call is not valid in the current state.
    #[error("cannot {operation} an alert that is {state}")]
    InvalidState {
        operation: &'static str,
        state: PresentationState,
    },

    /// The alert was configured with malformed input.
    #[error("invalid alert configuration: {0}")]
    Configuration(String),

    /// Another alert already occupies the overlay.
    #[error("the overlay is already showing another alert")]
    OverlayBusy,
}

pub type Result<T> = std::result::Result<T, AlertError>;

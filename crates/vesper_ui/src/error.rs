//! # UI Error Types
//!
//! All errors that can occur while building, laying out or presenting a frame.

use thiserror::Error;

use crate::geometry::Axis;

/// Errors that can occur in the UI core.
#[derive(Error, Debug)]
pub enum UiError {
    /// A `ParentPercent` widget has no ancestor with a rigid size on that axis.
    #[error("widget '{label}' sizes against its parent on {axis:?} but no ancestor has a rigid size")]
    MissingRigidAncestor {
        /// The widget being sized.
        label: String,
        /// The axis being solved.
        axis: Axis,
    },

    /// Two widgets were built with the same label in one frame.
    #[error("duplicate widget label in frame: {0}")]
    DuplicateLabel(String),

    /// `begin_frame` was called while a frame was already being built.
    #[error("frame already in progress")]
    FrameInProgress,

    /// A widget call or `end_frame` happened outside `begin_frame`/`end_frame`.
    #[error("no frame in progress")]
    NoFrameInProgress,

    /// More parents popped than pushed.
    #[error("parent stack underflow: the root cannot be popped")]
    ParentStackUnderflow,

    /// A handle from an earlier frame was used.
    #[error("widget handle from generation {handle} used in generation {current}")]
    StaleHandle {
        /// Generation stored in the handle.
        handle: u32,
        /// Generation of the frame being built.
        current: u32,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;

/// A render backend failed to draw a frame.
///
/// Recoverable: the frame is skipped and the next one is attempted normally.
#[derive(Error, Debug)]
#[error("render backend failed: {reason}")]
pub struct RenderError {
    /// What went wrong, as reported by the backend.
    pub reason: String,
}

impl RenderError {
    /// Creates a render error from any message.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

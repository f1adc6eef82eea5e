/// Result alias that carries the custom [`ClockError`] type.
pub type Result<T> = std::result::Result<T, ClockError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Free-form message for conditions that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed configuration or timeline JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A gear in the train has an unusable tooth count or radius.
    #[error("invalid gear `{name}`: {reason}")]
    InvalidGear { name: &'static str, reason: String },
    /// A configuration value outside its permitted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The timeline must contain at least one segment.
    #[error("segment timeline is empty")]
    EmptyTimeline,
    /// A segment record violates one of the timeline invariants.
    #[error("invalid segment `{id}`: {reason}")]
    InvalidSegment { id: String, reason: String },
    /// Camera position and look-at point coincide, so no orbit can be derived.
    #[error("camera position coincides with its look-at target")]
    DegenerateCamera,
    /// A component id that is not part of the movement.
    #[error("unknown component `{0}`")]
    UnknownComponent(String),
    /// Playback speed outside the configured set of options.
    #[error("unsupported playback speed {0}")]
    UnsupportedSpeed(f32),
}

impl ClockError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ClockError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ClockError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

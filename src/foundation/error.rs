/// Convenience result type used across lipsynth.
pub type LipsyncResult<T> = Result<T, LipsyncError>;

/// Top-level error taxonomy surfaced at the job boundary.
///
/// Recoverable kinds (`RecognizerUnavailable`, `GeometryDetection`, `Mux`) are normally absorbed
/// by the stage that produces them; they exist as variants so stages can report them uniformly.
#[derive(thiserror::Error, Debug)]
pub enum LipsyncError {
    /// Missing, corrupt or unsupported image/audio input.
    #[error("input error: {0}")]
    Input(String),

    /// The external phoneme recognizer could not be used.
    #[error("recognizer unavailable: {0}")]
    RecognizerUnavailable(String),

    /// Audio format conversion failed.
    #[error("transcode error: {0}")]
    Transcode(String),

    /// A geometry heuristic could not produce an estimate.
    #[error("geometry detection failure: {0}")]
    GeometryDetection(String),

    /// Frame rendering or the intermediate video artifact failed.
    #[error("render error: {0}")]
    Render(String),

    /// Muxing video with audio failed.
    #[error("mux error: {0}")]
    Mux(String),

    /// Invalid configuration or job parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// The job was cancelled cooperatively.
    #[error("job cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LipsyncError {
    /// Build a [`LipsyncError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`LipsyncError::RecognizerUnavailable`] value.
    pub fn recognizer(msg: impl Into<String>) -> Self {
        Self::RecognizerUnavailable(msg.into())
    }

    /// Build a [`LipsyncError::Transcode`] value.
    pub fn transcode(msg: impl Into<String>) -> Self {
        Self::Transcode(msg.into())
    }

    /// Build a [`LipsyncError::GeometryDetection`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::GeometryDetection(msg.into())
    }

    /// Build a [`LipsyncError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LipsyncError::Mux`] value.
    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    /// Build a [`LipsyncError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the pipeline is expected to recover from this error locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RecognizerUnavailable(_) | Self::GeometryDetection(_) | Self::Mux(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

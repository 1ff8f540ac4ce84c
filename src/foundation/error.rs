/// Convenience result type used across evocity.
pub type EvoResult<T> = Result<T, EvoError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Precondition violations on the playback control surface are not errors; they are reported as
/// [`crate::RejectReason`] values instead.
#[derive(thiserror::Error, Debug)]
pub enum EvoError {
    /// Invalid user-provided settings or snapshot data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A graph element references a node that is absent from the current layout pass.
    #[error("identity error: {0}")]
    Identity(String),

    /// Degenerate curve or sampling input.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A layout strategy could not place its input.
    #[error("layout error: {0}")]
    Layout(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EvoError {
    /// Build a [`EvoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`EvoError::Identity`] value.
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    /// Build a [`EvoError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`EvoError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`EvoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

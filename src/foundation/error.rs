/// Result alias used across the crate.
pub type VnResult<T> = Result<T, VnError>;

/// Failures reported by a [`crate::TextureBackend`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend could not allocate a texture (out of device memory, bad size, ...).
    #[error("texture creation failed: {0}")]
    Create(String),

    /// The backend could not upload pixel content into an existing texture.
    #[error("texture update failed: {0}")]
    Update(String),
}

impl BackendError {
    /// A [`BackendError::Create`] with `msg`.
    pub fn create(msg: impl Into<String>) -> Self {
        Self::Create(msg.into())
    }

    /// A [`BackendError::Update`] with `msg`.
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }
}

/// Errors returned by vnlayers.
#[derive(thiserror::Error, Debug)]
pub enum VnError {
    /// A backend create or update failure the caller has to handle.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A [`crate::SlotRef`] whose slot was freed or reused.
    #[error("stale slot reference: index {index}, seq {seq}")]
    StaleReference {
        /// Slot index the reference named.
        index: u32,
        /// Sequence number the reference was issued with.
        seq: u64,
    },

    /// Pixel buffers of mismatched length, or a region outside a surface.
    #[error("buffer error: {0}")]
    Buffer(String),

    /// Unreadable or invalid options.
    #[error("config error: {0}")]
    Config(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VnError {
    /// A [`VnError::Buffer`] with `msg`.
    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::Buffer(msg.into())
    }

    /// A [`VnError::Config`] with `msg`.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors that mean a caller used a dead or foreign [`crate::SlotRef`].
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, Self::StaleReference { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

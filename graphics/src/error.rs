//! Graphics error types.

use std::fmt;

use avatar_core::gltf::GltfError;

/// Errors that can occur in the graphics system.
#[derive(Debug)]
pub enum GraphicsError {
    /// Failed to create a resource.
    ResourceCreationFailed(String),
    /// A descriptor pool or buffer allocation could not be satisfied.
    ResourcePoolExhausted(String),
    /// Out of GPU memory.
    OutOfMemory,
    /// The GPU device was lost.
    DeviceLost,
    /// An invalid parameter was provided.
    InvalidParameter(String),
    /// An internal error occurred.
    Internal(String),
    /// The avatar asset failed to load.
    Asset(GltfError),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceCreationFailed(msg) => write!(f, "resource creation failed: {msg}"),
            Self::ResourcePoolExhausted(msg) => write!(f, "resource pool exhausted: {msg}"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::DeviceLost => write!(f, "GPU device lost"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
            Self::Asset(err) => write!(f, "asset error: {err}"),
        }
    }
}

impl std::error::Error for GraphicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Asset(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GltfError> for GraphicsError {
    fn from(err: GltfError) -> Self {
        Self::Asset(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::OutOfMemory;
        assert_eq!(err.to_string(), "out of GPU memory");

        let err = GraphicsError::ResourcePoolExhausted("4 uniform buffers requested".to_string());
        assert_eq!(
            err.to_string(),
            "resource pool exhausted: 4 uniform buffers requested"
        );
    }
}

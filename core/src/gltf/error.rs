//! Error types for avatar container loading.

/// Errors that can occur while loading an avatar container.
#[derive(Debug)]
pub enum GltfError {
    /// Structurally invalid input: bad magic, wrong chunk type, out-of-range
    /// index, malformed hierarchy.
    Format(String),
    /// Fewer bytes are available than a length field declares.
    Truncated {
        /// What was being read ("header", "chunk 1", ...).
        what: String,
        /// Declared byte count.
        declared: usize,
        /// Bytes actually available.
        available: usize,
    },
    /// The metadata chunk is not a valid document.
    Json(serde_json::Error),
    /// A primitive is missing position data.
    MissingPositions {
        /// Mesh index in the document.
        mesh: usize,
        /// Primitive index within the mesh.
        primitive: usize,
    },
}

impl GltfError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn truncated(what: impl Into<String>, declared: usize, available: usize) -> Self {
        Self::Truncated {
            what: what.into(),
            declared,
            available,
        }
    }

    /// Whether this error is a format failure (as opposed to truncation).
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Self::Format(_) | Self::Json(_) | Self::MissingPositions { .. }
        )
    }
}

impl std::fmt::Display for GltfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Truncated {
                what,
                declared,
                available,
            } => write!(
                f,
                "truncated input: {what} declares {declared} bytes but only {available} are available"
            ),
            Self::Json(e) => write!(f, "metadata parse error: {e}"),
            Self::MissingPositions { mesh, primitive } => {
                write!(
                    f,
                    "mesh {mesh} primitive {primitive} has no POSITION attribute"
                )
            }
        }
    }
}

impl std::error::Error for GltfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GltfError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncated() {
        let e = GltfError::truncated("chunk 0", 100, 40);
        assert_eq!(
            e.to_string(),
            "truncated input: chunk 0 declares 100 bytes but only 40 are available"
        );
        assert!(!e.is_format());
    }

    #[test]
    fn json_error_has_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e = GltfError::from(json_err);
        assert!(e.is_format());
        assert!(std::error::Error::source(&e).is_some());
    }
}

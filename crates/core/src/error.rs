//! Common error types shared across crates

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Core error types that can be shared across crates
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown category: {value}")]
    UnknownCategory { value: String },

    #[error("Unknown clothing type: {value}")]
    UnknownClothingType { value: String },
}

impl CoreError {
    /// Create an unknown category error
    pub fn unknown_category(value: impl Into<String>) -> Self {
        Self::UnknownCategory {
            value: value.into(),
        }
    }

    /// Create an unknown clothing type error
    pub fn unknown_clothing_type(value: impl Into<String>) -> Self {
        Self::UnknownClothingType {
            value: value.into(),
        }
    }
}

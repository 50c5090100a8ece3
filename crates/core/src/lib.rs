//! ootd core types and utilities
//!
//! Shared domain types for the closet backend (identity, cloth items, style
//! tags, recommendation sets), the gallery paging state, and tracing setup.

pub mod error;
pub mod gallery;
pub mod types;

#[cfg(feature = "tracing")]
pub mod tracing;

pub use error::{CoreError, CoreResult};
pub use gallery::{DEFAULT_PAGE_LIMIT, GalleryPager};
pub use types::{
    AccessToken, AddUpdateClothPayload, AuthResponse, Category, ClothItem, ClothStyle,
    ClothingType, ImageUpdateResponse, LoginPayload, MessageResponse, RecommendationSet,
    SaveClothResponse, Session, SignupPayload, StyleRef, StyleTag, User,
};

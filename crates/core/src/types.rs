use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Short-lived bearer credential authorizing API calls
///
/// The value is opaque to the client. `Debug` only prints a preview so the
/// token never ends up in logs in full.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 chars followed by `...`; short tokens are returned whole
    pub fn preview(&self) -> String {
        if self.0.len() > 12 {
            let cut = self
                .0
                .char_indices()
                .nth(8)
                .map_or(self.0.len(), |(idx, _)| idx);
            format!("{}...", &self.0[..cut])
        } else {
            self.0.clone()
        }
    }

    /// Value of the `Authorization` header for this token
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&self.preview()).finish()
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
}

/// The user session record: an access token paired with the identity it
/// was issued for. Both halves are always replaced together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: AccessToken,
    pub user: Option<User>,
}

impl Session {
    pub fn new(access_token: AccessToken, user: Option<User>) -> Self {
        Self { access_token, user }
    }
}

/// Body returned by login, signup and refresh
///
/// The refresh endpoint only returns the token, so `user` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub user: Option<User>,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self::new(response.access_token, response.user)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupPayload {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Gallery filter sent as the `type` query parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Top,
    Bottom,
    Accessory,
    Outerwear,
    Dress,
    Shoes,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Accessory => "accessory",
            Self::Outerwear => "outerwear",
            Self::Dress => "dress",
            Self::Shoes => "shoes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "accessory" => Ok(Self::Accessory),
            "outerwear" => Ok(Self::Outerwear),
            "dress" => Ok(Self::Dress),
            "shoes" => Ok(Self::Shoes),
            _ => Err(CoreError::unknown_category(s)),
        }
    }
}

/// Garment type chosen when adding an item; each maps onto one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClothingType {
    Top,
    Bottom,
    Sunglasses,
    Bag,
    Skirt,
    Jacket,
    Dress,
    Shoes,
    Accessory,
}

impl ClothingType {
    pub const ALL: [Self; 9] = [
        Self::Top,
        Self::Bottom,
        Self::Sunglasses,
        Self::Bag,
        Self::Skirt,
        Self::Jacket,
        Self::Dress,
        Self::Shoes,
        Self::Accessory,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Sunglasses => "sunglasses",
            Self::Bag => "bag",
            Self::Skirt => "skirt",
            Self::Jacket => "jacket",
            Self::Dress => "dress",
            Self::Shoes => "shoes",
            Self::Accessory => "accessory",
        }
    }

    pub const fn category(self) -> Category {
        match self {
            Self::Top => Category::Top,
            Self::Bottom | Self::Skirt => Category::Bottom,
            Self::Sunglasses | Self::Bag | Self::Accessory => Category::Accessory,
            Self::Jacket => Category::Outerwear,
            Self::Dress => Category::Dress,
            Self::Shoes => Category::Shoes,
        }
    }
}

impl fmt::Display for ClothingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClothingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| CoreError::unknown_clothing_type(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothStyle {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub cloth_type: String,
    pub colour: String,
    pub image_url: String,
    pub category: String,
    #[serde(default)]
    pub styles: Vec<ClothStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleTag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_flair: Option<String>,
    pub items: Vec<ClothItem>,
}

/// A style attached to a saved item: an existing tag, or a new one by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleRef {
    Existing { id: String, name: String },
    New { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUpdateClothPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub cloth_type: String,
    pub colour: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<StyleRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl AddUpdateClothPayload {
    /// The garment type named by `cloth_type`
    pub fn clothing_type(&self) -> CoreResult<ClothingType> {
        self.cloth_type.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveClothResponse {
    pub success: bool,
    #[serde(default)]
    pub cloth: Option<ClothItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpdateResponse {
    pub success: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

//! Closet API client methods

use ootd_core::{
    AddUpdateClothPayload, Category, ClothItem, ImageUpdateResponse, MessageResponse,
    RecommendationSet, SaveClothResponse, StyleTag,
};
use serde::Serialize;

use super::ApiClient;
use super::error::Result;

#[derive(Serialize)]
struct RecommendationRequest {
    item_id: i64,
}

#[derive(Serialize)]
struct ImageUpdateRequest<'a> {
    image_url: &'a str,
}

impl ApiClient {
    /// One page of the gallery for `category`
    pub async fn clothes_page(
        &self,
        category: Category,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ClothItem>> {
        self.get(&format!("/clothes?type={category}&limit={limit}&offset={offset}"))
            .await
    }

    pub async fn style_tags(&self) -> Result<Vec<StyleTag>> {
        self.get("/clothes/style-tags").await
    }

    /// A random selection for the home screen
    pub async fn random_clothes(&self) -> Result<Vec<ClothItem>> {
        self.get("/clothes/random").await
    }

    /// Outfit suggestions to pair with `item_id`
    pub async fn recommendations(&self, item_id: i64) -> Result<RecommendationSet> {
        self.post("/recommendations/ai", &RecommendationRequest { item_id })
            .await
    }

    /// Point an item at a newly uploaded image
    pub async fn update_cloth_image(
        &self,
        id: i64,
        image_url: &str,
    ) -> Result<ImageUpdateResponse> {
        self.put(&format!("/clothes/{id}/image"), &ImageUpdateRequest { image_url })
            .await
    }

    pub async fn delete_cloth(&self, id: i64) -> Result<MessageResponse> {
        self.delete(&format!("/clothes/{id}")).await
    }

    /// Create or update an item together with its style tags
    ///
    /// Fails without a request when `cloth_type` is not a known garment type.
    pub async fn save_cloth(&self, payload: &AddUpdateClothPayload) -> Result<SaveClothResponse> {
        let kind = payload.clothing_type()?;
        debug!(cloth_type = %kind, category = %kind.category(), "saving cloth");
        self.post("/clothes/embedded", payload).await
    }
}

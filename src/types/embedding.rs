use serde::{Deserialize, Serialize};

use super::completion::ImageData;

/// Request payload for `POST /embedding`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EmbeddingRequest {
    pub content: String,

    /// Images referenced from `content`, for multimodal models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<Vec<ImageData>>,
}

impl EmbeddingRequest {
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            image_data: None,
        }
    }
}

/// Response payload for `POST /embedding`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f64>,
}

use std::ops::Not;

use serde::{Deserialize, Serialize};

/// Request payload for `POST /tokenize`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TokenizeRequest {
    pub content: String,

    /// Insert special tokens such as BOS. Omitted from the body when `false`.
    #[serde(default, skip_serializing_if = "<&bool>::not")]
    pub add_special: bool,
}

impl TokenizeRequest {
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            add_special: false,
        }
    }
}

/// Response payload for `POST /tokenize`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TokenizeResponse {
    pub tokens: Vec<u32>,
}

/// Request payload for `POST /detokenize`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DetokenizeRequest {
    pub tokens: Vec<u32>,
}

impl From<Vec<u32>> for DetokenizeRequest {
    fn from(tokens: Vec<u32>) -> Self {
        Self { tokens }
    }
}

/// Response payload for `POST /detokenize`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DetokenizeResponse {
    pub content: String,
}

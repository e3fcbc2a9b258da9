use serde::{Deserialize, Serialize};

use super::completion::GenerationSettings;

/// Properties returned by `GET /props`.
///
/// All fields are optional so that older or newer server builds that add or
/// drop fields still decode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PropsResponse {
    /// Assistant role label from the server's system prompt, e.g. `"Assistant:"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,

    /// Anti-prompt used to stop generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_prompt: Option<String>,

    /// User role label, e.g. `"User:"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Number of parallel slots the server was started with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_slots: Option<u32>,

    /// Chat template shipped with the model, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_template: Option<String>,

    /// The settings a `/completion` call uses when no overrides are sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_generation_settings: Option<GenerationSettings>,
}

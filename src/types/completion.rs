use std::{collections::HashMap, ops::Not};

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Request payload for `POST /completion`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, Builder)]
#[builder(derive(Debug, Clone))]
pub struct CompletionRequest {
    /// The text to continue.
    #[builder(into)]
    pub prompt: String,

    /// Sampling and generation controls. Flattened into the top level of the JSON body.
    #[serde(flatten)]
    #[builder(default)]
    pub settings: CompletionSettings,
}

/// Generation-control parameters accepted by `/completion`.
///
/// Every knob is optional: `None` is left off the wire so the server applies its own
/// default, which is not the same thing as sending an explicit zero.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, Builder)]
#[builder(derive(Debug, Clone))]
pub struct CompletionSettings {
    /// Randomness of the generated text. Server default: `0.8`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Limit the next token selection to the K most probable tokens. Server default: `40`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,

    /// Limit the next token selection to a subset of tokens with a cumulative
    /// probability above P. Server default: `0.95`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Minimum probability for a token to be considered, relative to the most likely token.
    /// Server default: `0.05`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_p: Option<f64>,

    /// Maximum number of tokens to predict.
    ///
    /// May be exceeded slightly if the last token is a partial multibyte character.
    /// `0` generates nothing but still evaluates the prompt into the cache; `-1` means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_predict: Option<i32>,

    /// Number of prompt tokens to retain when the context size is exceeded.
    /// `0` keeps none, `-1` keeps all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_keep: Option<i32>,

    /// Ask the server to stream tokens as they are produced.
    ///
    /// This client only decodes a single final response, so leave this unset.
    #[serde(default, skip_serializing_if = "<&bool>::not")]
    #[builder(default)]
    pub stream: bool,

    /// Stopping strings. They are not included in the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Tail free sampling parameter z. `1.0` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tfs_z: Option<f64>,

    /// Locally typical sampling parameter p. `1.0` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typical_p: Option<f64>,

    /// Penalty applied to repeated token sequences. Server default: `1.1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f64>,

    /// How many of the last tokens to consider for the repeat penalty.
    /// `0` disables it, `-1` uses the context size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_last_n: Option<i32>,

    /// Whether newline tokens count toward the repeat penalty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalize_nl: Option<bool>,

    /// Repeat alpha presence penalty. `0.0` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,

    /// Repeat alpha frequency penalty. `0.0` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,

    /// Mirostat mode: `0` disabled, `1` Mirostat, `2` Mirostat 2.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat: Option<u8>,

    /// Mirostat target entropy (tau). Server default: `5.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_tau: Option<f64>,

    /// Mirostat learning rate (eta). Server default: `0.1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_eta: Option<f64>,

    /// GBNF grammar constraining the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub grammar: Option<String>,

    /// RNG seed. `-1` picks a random seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    /// Keep generating past the end-of-stream token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_eos: Option<bool>,

    /// Per-token likelihood adjustments, e.g. `[[15043, 1.0]]` or `[[15043, false]]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<Vec<LogitBias>>,

    /// Number of top tokens to return with their probabilities. `0` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_probs: Option<u32>,

    /// Base64 images referenced from the prompt as `[img-<id>]`. Multimodal models only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<Vec<ImageData>>,

    /// Pin the task to a slot. `-1` lets the server pick an idle one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<i32>,

    /// Reuse the slot's cached prompt prefix instead of reprocessing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_prompt: Option<bool>,

    /// Replace the system prompt shared by all slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub system_prompt: Option<String>,
}

/// Image referenced from a prompt by `[img-<id>]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Base64 encoded image bytes.
    pub data: String,
    pub id: i64,
}

/// One `logit_bias` entry, encoded on the wire as a two element array.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LogitBias(pub u32, pub Bias);

impl LogitBias {
    pub fn weight(token: u32, weight: f64) -> Self {
        Self(token, Bias::Weight(weight))
    }

    /// The token is never produced.
    pub fn ban(token: u32) -> Self {
        Self(token, Bias::Banned(false))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Bias {
    Weight(f64),
    /// The server only understands `false` here.
    Banned(bool),
}

/// Settings the server actually used, echoed back in completion and props responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GenerationSettings {
    #[serde(flatten)]
    pub settings: CompletionSettings,
    pub model: String,
    pub n_ctx: u32,
}

/// Timing statistics for a completion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Timings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_n: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_per_token_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_n: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_per_token_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_per_second: Option<f64>,
    /// Any other numeric stat the server reports, e.g. `cache_n` on newer builds.
    #[serde(flatten)]
    pub extra: HashMap<String, f64>,
}

/// Response payload for `POST /completion`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CompletionResponse {
    /// Generated text, without any stopping word.
    pub content: String,
    pub stop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_settings: Option<GenerationSettings>,
    pub model: String,
    pub prompt: String,
    /// Stopped because the EOS token was produced.
    pub stopped_eos: bool,
    /// Stopped because `n_predict` tokens were generated first.
    pub stopped_limit: bool,
    /// Stopped on one of the request's `stop` strings.
    pub stopped_word: bool,
    /// The stop string that ended generation, or empty.
    pub stopping_word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<Timings>,
    /// Prompt tokens reused from the slot's cache (`n_past`).
    pub tokens_cached: u64,
    /// Prompt tokens evaluated in total.
    pub tokens_evaluated: u64,
    pub tokens_predicted: u64,
    /// The prompt plus generated tokens exceeded `n_ctx`.
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<i32>,
}

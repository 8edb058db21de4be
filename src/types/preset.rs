//! Preset types
//!
//! A preset binds a model to a persona and sampling parameters. Optional
//! fields fall back to the backend defaults when missing or null.

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! or_default {
    ($default_fn:ident, $null_fn:ident, $ty:ty, $value:expr) => {
        fn $default_fn() -> $ty {
            $value
        }

        fn $null_fn<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$ty, D::Error> {
            Ok(Option::<$ty>::deserialize(deserializer)?.unwrap_or_else($default_fn))
        }
    };
}

or_default!(default_bot_name, null_bot_name, String, "bot".to_string());
or_default!(default_text, null_text, String, String::new());
or_default!(default_temperature, null_temperature, f64, 1.2);
or_default!(default_repetition_penalty, null_repetition_penalty, f64, 1.0);
or_default!(default_top_p, null_top_p, f64, 0.9);
or_default!(default_top_k, null_top_k, f64, 20.0);

/// Editable preset fields, shared by create/update payloads and stored records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPreset {
    /// Name shown in listings and in the chat header
    pub public_name: String,
    #[serde(default = "default_bot_name", deserialize_with = "null_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_text", deserialize_with = "null_text")]
    pub task: String,
    /// Free-form constraints (field name matches the backend)
    #[serde(default = "default_text", deserialize_with = "null_text")]
    pub costraints: String,
    pub model_id: i64,
    #[serde(default = "default_temperature", deserialize_with = "null_temperature")]
    pub temperature: f64,
    #[serde(
        default = "default_repetition_penalty",
        deserialize_with = "null_repetition_penalty"
    )]
    pub repetition_penalty: f64,
    #[serde(default = "default_top_p", deserialize_with = "null_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k", deserialize_with = "null_top_k")]
    pub top_k: f64,
}

impl NewPreset {
    /// A preset with backend defaults for everything but name and model
    pub fn new(public_name: impl Into<String>, model_id: i64) -> Self {
        Self {
            public_name: public_name.into(),
            bot_name: default_bot_name(),
            task: default_text(),
            costraints: default_text(),
            model_id,
            temperature: default_temperature(),
            repetition_penalty: default_repetition_penalty(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

/// A preset stored by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRecord {
    pub id: i64,
    #[serde(flatten)]
    pub fields: NewPreset,
}

impl PresetRecord {
    pub fn public_name(&self) -> &str {
        &self.fields.public_name
    }

    pub fn model_id(&self) -> i64 {
        self.fields.model_id
    }

    /// Copy of the editable fields pointing at another model
    pub fn retarget(&self, model_id: i64) -> NewPreset {
        NewPreset {
            model_id,
            ..self.fields.clone()
        }
    }
}

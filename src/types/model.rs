//! Model types
//!
//! Model records as stored by the inference backend.

use serde::{Deserialize, Serialize};

/// A model registered with the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: i64,
    /// Display name of the model
    pub model_name: String,
    /// HuggingFace repository reference (field name matches the backend)
    pub huggin_face_refference: String,
    /// Human-readable size computed by the backend, e.g. "4.1 GB"
    #[serde(default)]
    pub size: Option<String>,
}

impl ModelRecord {
    /// Two records describe the same model when name and reference match
    pub fn same_model_as(&self, other: &ModelRecord) -> bool {
        self.model_name == other.model_name
            && self.huggin_face_refference == other.huggin_face_refference
    }

    /// Payload used to recreate this model on another backend
    pub fn to_new(&self) -> NewModel {
        NewModel {
            model_name: self.model_name.clone(),
            huggin_face_refference: self.huggin_face_refference.clone(),
        }
    }
}

/// Payload for creating or updating a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModel {
    pub model_name: String,
    pub huggin_face_refference: String,
}

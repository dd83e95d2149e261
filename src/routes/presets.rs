use axum::Json;
use serde_json::{Value, json};

use crate::research::prompt::PRESET_QUERIES;

pub async fn list_presets() -> Json<Value> {
    Json(json!({ "queries": PRESET_QUERIES }))
}

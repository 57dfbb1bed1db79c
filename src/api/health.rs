use serde_json::{json, Value};

use crate::middleware::ApiResponse;

pub async fn health_check() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "healthy",
        "message": "API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

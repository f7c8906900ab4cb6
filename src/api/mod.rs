pub mod http;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use crate::config::ApiConfig;
use crate::models::api::{ HealthStatus, PlanResponse, RecipeResponse, ShoppingLinks };
use self::http::HttpMealPlannerClient;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx answer; `message` is the server `detail` when it sent one.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
    },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_detail(body).unwrap_or_else(||
            format!("HTTP error! status: {}", status)
        );
        ApiError::Status { status, message }
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        _ => None,
    }
}

#[async_trait]
pub trait MealPlannerApi: Send + Sync {
    /// Never fails: transport and HTTP errors come back as `status: "error"`.
    async fn check_health(&self) -> HealthStatus;

    async fn generate_meal_plan(
        &self,
        query: &str,
        constraints: &[String],
        include_shopping_links: bool
    ) -> Result<PlanResponse, ApiError>;

    async fn generate_recipe(
        &self,
        ingredients: &[String],
        constraints: &[String],
        include_shopping_links: bool
    ) -> Result<RecipeResponse, ApiError>;

    async fn get_shopping_links(&self, ingredients: &[String]) -> Result<ShoppingLinks, ApiError>;

    fn base_url(&self) -> String;
}

pub fn new_client(config: &ApiConfig) -> Result<Arc<dyn MealPlannerApi>, ApiError> {
    let client = HttpMealPlannerClient::from_config(config)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_message_is_surfaced_verbatim() {
        let err = ApiError::from_status(503, r#"{"detail":"model overloaded"}"#);
        assert_eq!(err.to_string(), "model overloaded");
    }

    #[test]
    fn status_used_without_detail() {
        assert_eq!(ApiError::from_status(502, "Bad Gateway").to_string(), "HTTP error! status: 502");
        assert_eq!(ApiError::from_status(500, r#"{"error":"x"}"#).to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn structured_detail_falls_back_to_status() {
        let body = r#"{"detail":[{"loc":["body","query"],"msg":"field required"}]}"#;
        assert_eq!(ApiError::from_status(422, body).to_string(), "HTTP error! status: 422");
    }
}

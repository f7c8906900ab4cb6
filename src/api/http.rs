use async_trait::async_trait;
use log::{ debug, error, warn };
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use super::{ ApiError, MealPlannerApi };
use crate::config::ApiConfig;
use crate::models::api::{
    HealthStatus,
    MealPlanRequest,
    PlanResponse,
    RecipeRequest,
    RecipeResponse,
    ShoppingLinks,
    ShoppingListRequest,
    ShoppingResponse,
};

#[derive(Debug, Clone)]
pub struct HttpMealPlannerClient {
    http: HttpClient,
    config: ApiConfig,
}

impl HttpMealPlannerClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    async fn post_json<T, R>(&self, url: &str, payload: &T) -> Result<R, ApiError>
        where T: Serialize + ?Sized, R: DeserializeOwned
    {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(payload).send().await?;
        Self::read_json(resp).await
    }

    async fn read_json<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &body);
            error!("Request failed with status {}: {}", status.as_u16(), err);
            return Err(err);
        }
        serde_json::from_str::<R>(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch_health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.config.health_url();
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;
        Self::read_json(resp).await
    }
}

#[async_trait]
impl MealPlannerApi for HttpMealPlannerClient {
    async fn check_health(&self) -> HealthStatus {
        match self.fetch_health().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Health check against {} failed: {}", self.config.base_url, e);
                HealthStatus::error(e.to_string())
            }
        }
    }

    async fn generate_meal_plan(
        &self,
        query: &str,
        constraints: &[String],
        include_shopping_links: bool
    ) -> Result<PlanResponse, ApiError> {
        let req = MealPlanRequest {
            query: query.to_string(),
            constraints: constraints.to_vec(),
            include_shopping_links,
        };
        self.post_json(&self.config.plan_url(), &req).await
    }

    async fn generate_recipe(
        &self,
        ingredients: &[String],
        constraints: &[String],
        include_shopping_links: bool
    ) -> Result<RecipeResponse, ApiError> {
        let req = RecipeRequest {
            ingredients: ingredients.to_vec(),
            constraints: constraints.to_vec(),
            include_shopping_links,
        };
        self.post_json(&self.config.recipe_url(), &req).await
    }

    async fn get_shopping_links(&self, ingredients: &[String]) -> Result<ShoppingLinks, ApiError> {
        let req = ShoppingListRequest {
            ingredients: ingredients.to_vec(),
        };
        let resp: ShoppingResponse = self.post_json(&self.config.shopping_url(), &req).await?;
        Ok(resp.into_links())
    }

    fn base_url(&self) -> String {
        self.config.base_url.clone()
    }
}

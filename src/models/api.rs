use serde::{ Serialize, Deserialize };
use std::collections::BTreeMap;

#[derive(Serialize, Debug, Clone)]
pub struct MealPlanRequest {
    pub query: String,
    pub constraints: Vec<String>,
    pub include_shopping_links: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct RecipeRequest {
    pub ingredients: Vec<String>,
    pub constraints: Vec<String>,
    pub include_shopping_links: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct ShoppingListRequest {
    pub ingredients: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShoppingLink {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ingredient: Option<String>,
}

pub type ShoppingLinks = BTreeMap<String, ShoppingLink>;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlanResponse {
    pub meal_plan: String,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub shopping_links: Option<ShoppingLinks>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecipeResponse {
    pub recipe: String,
    #[serde(default)]
    pub shopping_links: Option<ShoppingLinks>,
}

/// Item of the `shopping_list` array returned by `/ingredients/shop`.
#[derive(Deserialize, Debug, Clone)]
pub struct ShoppingListItem {
    #[serde(default)]
    pub ingredient: Option<String>,
    #[serde(default)]
    pub ingredient_name: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub amazon_fresh_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ShoppingResponse {
    List {
        shopping_list: Vec<ShoppingListItem>,
    },
    Map(ShoppingLinks),
}

impl ShoppingResponse {
    pub fn into_links(self) -> ShoppingLinks {
        match self {
            ShoppingResponse::Map(links) => links,
            ShoppingResponse::List { shopping_list } => {
                let mut links = ShoppingLinks::new();
                for item in shopping_list {
                    let key = item.ingredient_name
                        .clone()
                        .or_else(|| item.ingredient.clone())
                        .unwrap_or_default();
                    if key.is_empty() {
                        continue;
                    }
                    links.insert(key, ShoppingLink {
                        url: item.amazon_fresh_url,
                        ingredient: item.ingredient,
                    });
                }
                links
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sagemaker_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_mapper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn error(message: String) -> Self {
        Self {
            status: "error".to_string(),
            sagemaker_endpoint: None,
            ingredient_mapper: None,
            error: Some(message),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shopping_map_shape_is_kept() {
        let body = r#"{"chicken": {"url": "https://example.com/c", "ingredient": "chicken"}}"#;
        let links = serde_json::from_str::<ShoppingResponse>(body).unwrap().into_links();
        assert_eq!(links["chicken"].url.as_deref(), Some("https://example.com/c"));
    }

    #[test]
    fn shopping_list_shape_is_keyed_by_name() {
        let body = r#"{"shopping_list": [
            {"ingredient": "2 cups rice", "ingredient_name": "cups rice", "amount": "2",
             "unit": "", "amazon_fresh_url": "https://example.com/rice"},
            {"ingredient": "salt", "ingredient_name": "salt", "amount": null,
             "unit": null, "amazon_fresh_url": "https://example.com/salt"}
        ]}"#;
        let links = serde_json::from_str::<ShoppingResponse>(body).unwrap().into_links();
        assert_eq!(links.len(), 2);
        assert_eq!(links["cups rice"].ingredient.as_deref(), Some("2 cups rice"));
        assert_eq!(links["salt"].url.as_deref(), Some("https://example.com/salt"));
    }

    #[test]
    fn plan_response_tolerates_null_links() {
        let body = r#"{"meal_plan": "text", "ingredients": [], "shopping_links": null}"#;
        let plan: PlanResponse = serde_json::from_str(body).unwrap();
        assert!(plan.shopping_links.is_none());
        assert_eq!(plan.ingredients, Some(vec![]));
    }
}

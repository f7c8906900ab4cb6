pub mod render;

use log::{ debug, error, info, warn };
use serde_json::Value as JsonValue;
use std::sync::{ Arc, Mutex, MutexGuard };
use uuid::Uuid;
use crate::api::{ ApiError, MealPlannerApi };
use crate::classifier::{ classify, ChatRequest };
use crate::formatter;
use crate::models::api::HealthStatus;
use crate::models::chat::{ ChatMessage, MessageKind };

/// Conversation state. Only the controller mutates it.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    messages: Vec<ChatMessage>,
    processing: bool,
    banner: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            processing: false,
            banner: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Records the user message and marks the session busy. Returns `None`
    /// (and changes nothing) for blank input or while a request is in flight.
    pub fn begin(&mut self, input: &str) -> Option<ChatRequest> {
        let text = input.trim();
        if text.is_empty() || self.processing {
            return None;
        }
        self.messages.push(ChatMessage::user(text));
        self.processing = true;
        Some(classify(text))
    }

    pub fn begin_direct(&mut self, input: &str) -> bool {
        let text = input.trim();
        if text.is_empty() || self.processing {
            return false;
        }
        self.messages.push(ChatMessage::user(text));
        self.processing = true;
        true
    }

    pub fn complete(&mut self, reply: ChatMessage) {
        self.messages.push(reply);
        self.processing = false;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn set_banner(&mut self, text: String) {
        self.banner = Some(text);
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }
}

#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Blank input or another request still in flight.
    Dropped,
    Replied(ChatMessage),
}

pub struct ChatController {
    api: Arc<dyn MealPlannerApi>,
    session: Mutex<ChatSession>,
    include_shopping_links: bool,
}

impl ChatController {
    pub fn new(api: Arc<dyn MealPlannerApi>, include_shopping_links: bool) -> Self {
        Self {
            api,
            session: Mutex::new(ChatSession::new()),
            include_shopping_links,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> ChatSession {
        self.lock().clone()
    }

    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_processing(&self) -> bool {
        self.lock().processing
    }

    pub fn clear(&self) {
        let mut session = self.lock();
        session.clear();
        info!("Chat {} cleared", session.id);
    }

    pub fn dismiss_banner(&self) {
        self.lock().dismiss_banner();
    }

    pub async fn check_health(&self) -> HealthStatus {
        let status = self.api.check_health().await;
        if status.is_healthy() {
            info!("API at {} is healthy", self.api.base_url());
            self.lock().dismiss_banner();
        } else {
            let reason = status.error.clone().unwrap_or_else(|| status.status.clone());
            warn!("API at {} is not healthy: {}", self.api.base_url(), reason);
            self.lock().set_banner(
                format!(
                    "The meal planner API at {} is unavailable ({}). Requests may fail.",
                    self.api.base_url(),
                    reason
                )
            );
        }
        status
    }

    /// Classifies `input`, calls the API and appends the formatted reply.
    /// Input arriving while a request is in flight is dropped.
    pub async fn send(&self, input: &str) -> SendOutcome {
        let begun = self.lock().begin(input);
        let request = match begun {
            Some(request) => request,
            None => {
                debug!("Dropping submission: empty input or request already in flight");
                return SendOutcome::Dropped;
            }
        };

        let reply = match self.dispatch(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Request failed: {}", e);
                ChatMessage::error(&e.to_string())
            }
        };
        self.lock().complete(reply.clone());
        SendOutcome::Replied(reply)
    }

    /// Looks up shopping links for a comma separated ingredient list.
    pub async fn shop(&self, input: &str) -> SendOutcome {
        let ingredients: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();
        if ingredients.is_empty() {
            return SendOutcome::Dropped;
        }
        let begun = self.lock().begin_direct(&format!("/shop {}", input.trim()));
        if !begun {
            return SendOutcome::Dropped;
        }

        let reply = match self.api.get_shopping_links(&ingredients).await {
            Ok(links) => {
                let data = serde_json::to_value(&links).unwrap_or(JsonValue::Null);
                ChatMessage::assistant(
                    formatter::format_shopping_list(&links),
                    MessageKind::ShoppingList,
                    data
                )
            }
            Err(e) => {
                error!("Shopping link lookup failed: {}", e);
                ChatMessage::error(&e.to_string())
            }
        };
        self.lock().complete(reply.clone());
        SendOutcome::Replied(reply)
    }

    async fn dispatch(&self, request: &ChatRequest) -> Result<ChatMessage, ApiError> {
        let constraints = request.constraint_strings();
        match request {
            ChatRequest::MealPlan { query, .. } => {
                info!("Requesting meal plan ({} constraints)", constraints.len());
                let plan = self.api.generate_meal_plan(
                    query,
                    &constraints,
                    self.include_shopping_links
                ).await?;
                let html = formatter::format_meal_plan(&plan);
                let data = serde_json::to_value(&plan).map_err(|e| ApiError::Decode(e.to_string()))?;
                Ok(ChatMessage::assistant(html, MessageKind::MealPlan, data))
            }
            ChatRequest::Recipe { ingredients, .. } => {
                info!(
                    "Requesting recipe for {} ingredients ({} constraints)",
                    ingredients.len(),
                    constraints.len()
                );
                let recipe = self.api.generate_recipe(
                    ingredients,
                    &constraints,
                    self.include_shopping_links
                ).await?;
                let html = formatter::format_recipe(&recipe);
                let data = serde_json::to_value(&recipe).map_err(|e| ApiError::Decode(e.to_string()))?;
                Ok(ChatMessage::assistant(html, MessageKind::Recipe, data))
            }
        }
    }
}

use chrono::{ TimeZone, Utc };
use serde_json::Value as JsonValue;
use super::ChatSession;
use crate::formatter::escape_text;
use crate::models::chat::{ ChatMessage, MessageKind, Role };

pub const WELCOME_TITLE: &str = "Welcome to the AI Meal Planner";
pub const WELCOME_TEXT: &str =
    "Ask for a meal plan (\"a high-protein dinner, no dairy, under 600 calories\") \
     or a recipe (\"Generate a recipe using: chicken, broccoli, garlic\").";

pub fn welcome_html() -> String {
    format!(
        "<div class=\"welcome-message\"><h2>{}</h2><p>{}</p></div>",
        escape_text(WELCOME_TITLE),
        escape_text(WELCOME_TEXT)
    )
}

/// Markup for the whole message list; an empty list shows the welcome
/// placeholder instead.
pub fn render_messages(session: &ChatSession) -> String {
    let mut html = String::new();
    if let Some(banner) = session.banner() {
        html.push_str(
            &format!("<div class=\"warning-banner\">{}</div>", escape_text(banner))
        );
    }
    if session.messages().is_empty() {
        html.push_str(&welcome_html());
    } else {
        for message in session.messages() {
            html.push_str(&render_message(message));
        }
    }
    if session.is_processing() {
        html.push_str("<div class=\"message assistant typing\">Planning your meal...</div>");
    }
    html
}

pub fn render_message(message: &ChatMessage) -> String {
    let (class, body) = match (message.role, message.kind()) {
        (Role::User, _) => ("user", format!("<p>{}</p>", escape_text(&message.content))),
        (Role::Assistant, Some(MessageKind::Error)) =>
            (
                "assistant error",
                format!("<p class=\"error-message\">{}</p>", escape_text(&message.content)),
            ),
        (Role::Assistant, _) => ("assistant", message.content.clone()),
    };
    format!(
        "<div class=\"message {}\"><div class=\"message-content\">{}</div><span class=\"timestamp\">{}</span></div>",
        class,
        body,
        format_time(message.timestamp)
    )
}

pub fn render_page(session: &ChatSession) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>AI Meal Planner</title>\n</head>\n<body>\n<div id=\"chat-messages\">{}</div>\n</body>\n</html>\n",
        render_messages(session)
    )
}

fn format_time(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Terminal rendering of a message, built from the raw response kept in the
/// metadata rather than from the HTML.
pub fn plain_text(message: &ChatMessage) -> String {
    let Some(meta) = &message.metadata else {
        return message.content.clone();
    };
    let mut text = match meta.kind {
        MessageKind::Error => {
            return format!("Error: {}", message.content);
        }
        MessageKind::MealPlan => string_field(&meta.data, "meal_plan"),
        MessageKind::Recipe => string_field(&meta.data, "recipe"),
        MessageKind::ShoppingList => String::new(),
    };

    let links = match meta.kind {
        MessageKind::ShoppingList => Some(&meta.data),
        _ => meta.data.get("shopping_links"),
    };
    if let Some(JsonValue::Object(links)) = links {
        let lines: Vec<String> = links
            .iter()
            .filter_map(|(name, link)| {
                link.get("url")
                    .and_then(JsonValue::as_str)
                    .map(|url| format!("  - {}: {}", name, url))
            })
            .collect();
        if !lines.is_empty() {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str("Shopping links:\n");
            text.push_str(&lines.join("\n"));
        } else if meta.kind == MessageKind::ShoppingList {
            text.push_str("No shopping links found for those ingredients.");
        }
    }
    text
}

fn string_field(data: &JsonValue, key: &str) -> String {
    data.get(key)
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

use once_cell::sync::Lazy;
use regex::Regex;
use crate::models::api::{ PlanResponse, RecipeResponse, ShoppingLinks };

static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-•]\s*|\*\s+|\d+[.)]\s+)(.+)$").expect("valid regex")
});

static BOLD: Lazy<Regex> = Lazy::new(|| { Regex::new(r"\*\*(.+?)\*\*").expect("valid regex") });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Neither,
    Ingredients,
    Instructions,
}

struct SectionWriter {
    out: String,
    section: Section,
    saw_ingredients: bool,
}

impl SectionWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            section: Section::Neither,
            saw_ingredients: false,
        }
    }

    fn close(&mut self) {
        match self.section {
            Section::Ingredients => self.out.push_str("</ul></div>"),
            Section::Instructions => self.out.push_str("</ol></div>"),
            Section::Neither => {}
        }
        self.section = Section::Neither;
    }

    fn open(&mut self, section: Section, heading: &str) {
        self.close();
        match section {
            Section::Ingredients => {
                self.saw_ingredients = true;
                self.out.push_str(
                    &format!(
                        "<div class=\"ingredients-section\"><h4>{}</h4><ul>",
                        escape_text(heading)
                    )
                );
            }
            Section::Instructions => {
                self.out.push_str(
                    &format!(
                        "<div class=\"instructions-section\"><h4>{}</h4><ol>",
                        escape_text(heading)
                    )
                );
            }
            Section::Neither => {
                return;
            }
        }
        self.section = section;
    }

    fn item(&mut self, text: &str) {
        self.out.push_str(&format!("<li>{}</li>", inline(text)));
    }

    fn paragraph(&mut self, text: &str) {
        self.out.push_str(&format!("<p>{}</p>", inline(text)));
    }

    fn labelled(&mut self, class: &str, text: &str) {
        self.close();
        let (label, value) = match text.split_once(':') {
            Some((label, value)) => (label.trim(), value.trim()),
            None => (text.trim(), ""),
        };
        self.out.push_str(
            &format!(
                "<p class=\"{}\"><strong>{}:</strong> {}</p>",
                class,
                escape_text(label),
                inline(value)
            )
        );
    }

    fn line(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let plain = trimmed.replace("**", "");
        let plain = plain.trim();
        let lower = plain.to_lowercase();
        let list_item = LIST_MARKER.captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim());
        let is_header = list_item.is_none() && (trimmed.contains("**") || plain.ends_with(':'));

        if list_item.is_none() && lower.contains("recipe:") {
            self.close();
            let name = plain
                .split_once(':')
                .map(|(_, name)| name.trim())
                .filter(|name| !name.is_empty())
                .unwrap_or(plain);
            self.out.push_str(
                &format!("<h3 class=\"recipe-title\">{}</h3>", escape_text(name))
            );
            return;
        }

        if is_header && lower.contains("ingredient") {
            self.open(Section::Ingredients, plain.trim_end_matches(':').trim());
            return;
        }

        if
            is_header &&
            (lower.contains("instruction") ||
                lower.contains("step") ||
                lower.contains("direction"))
        {
            self.open(Section::Instructions, plain.trim_end_matches(':').trim());
            return;
        }

        if list_item.is_none() && lower.contains("calories:") {
            self.labelled("calories", plain);
            return;
        }

        if list_item.is_none() && lower.contains("constraints") && plain.contains(':') {
            self.labelled("constraints", plain);
            return;
        }

        match self.section {
            Section::Ingredients => {
                if let Some(item) = list_item {
                    self.item(item);
                    return;
                }
                if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
                    self.item(trimmed);
                    return;
                }
                self.close();
                self.paragraph(trimmed);
            }
            Section::Instructions => {
                if is_header {
                    self.close();
                    self.paragraph(trimmed);
                    return;
                }
                self.item(list_item.unwrap_or(trimmed));
            }
            Section::Neither => {
                self.paragraph(trimmed);
            }
        }
    }

    fn finish(mut self) -> (String, bool) {
        self.close();
        (self.out, self.saw_ingredients)
    }
}

fn format_sections(text: &str) -> (String, bool) {
    let mut writer = SectionWriter::new();
    for line in text.lines() {
        writer.line(line);
    }
    writer.finish()
}

/// Turns model output into chat-bubble HTML. Every section opened is closed
/// before returning.
pub fn format_response_text(text: &str) -> String {
    format_sections(text).0
}

pub fn format_meal_plan(plan: &PlanResponse) -> String {
    let (mut html, saw_ingredients) = format_sections(&plan.meal_plan);
    if !saw_ingredients {
        if let Some(ingredients) = plan.ingredients.as_ref().filter(|i| !i.is_empty()) {
            html.push_str("<div class=\"ingredients-section\"><h4>Ingredients</h4><ul>");
            for ingredient in ingredients {
                html.push_str(&format!("<li>{}</li>", escape_text(ingredient)));
            }
            html.push_str("</ul></div>");
        }
    }
    if let Some(links) = &plan.shopping_links {
        html.push_str(&format_shopping_links(links));
    }
    wrap(&html)
}

pub fn format_recipe(recipe: &RecipeResponse) -> String {
    let mut html = format_response_text(&recipe.recipe);
    if let Some(links) = &recipe.shopping_links {
        html.push_str(&format_shopping_links(links));
    }
    wrap(&html)
}

pub fn format_shopping_list(links: &ShoppingLinks) -> String {
    let block = format_shopping_links(links);
    if block.is_empty() {
        return wrap("<p>No shopping links found for those ingredients.</p>");
    }
    wrap(&block)
}

/// Empty string when no entry carries a usable http(s) URL.
pub fn format_shopping_links(links: &ShoppingLinks) -> String {
    let items: Vec<String> = links
        .iter()
        .filter_map(|(name, link)| {
            let url = link.url.as_deref()?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return None;
            }
            Some(
                format!(
                    "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
                    html_escape::encode_double_quoted_attribute(url),
                    escape_text(name)
                )
            )
        })
        .collect();

    if items.is_empty() {
        return String::new();
    }
    format!("<div class=\"shopping-links\"><h4>Shopping Links</h4><ul>{}</ul></div>", items.concat())
}

fn wrap(inner: &str) -> String {
    format!("<div class=\"meal-response\">{}</div>", inner)
}

fn inline(text: &str) -> String {
    BOLD.replace_all(&escape_text(text), "<strong>$1</strong>").into_owned()
}

pub fn escape_text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

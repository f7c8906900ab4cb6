use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Free-text dietary restriction, passed to the API untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint(pub String);

impl Constraint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequest {
    MealPlan {
        query: String,
        constraints: Vec<Constraint>,
    },
    Recipe {
        ingredients: Vec<String>,
        constraints: Vec<Constraint>,
    },
}

impl ChatRequest {
    pub fn constraints(&self) -> &[Constraint] {
        match self {
            ChatRequest::MealPlan { constraints, .. } => constraints,
            ChatRequest::Recipe { constraints, .. } => constraints,
        }
    }

    pub fn constraint_strings(&self) -> Vec<String> {
        self.constraints()
            .iter()
            .map(|c| c.0.clone())
            .collect()
    }
}

struct Rule {
    name: &'static str,
    predicate: fn(&str) -> bool,
    extract: fn(&str) -> Option<ChatRequest>,
}

static RULES: &[Rule] = &[
    Rule {
        name: "recipe",
        predicate: looks_like_recipe,
        extract: extract_recipe,
    },
    Rule {
        name: "meal_plan",
        predicate: always,
        extract: extract_meal_plan,
    },
];

static INGREDIENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\busing:\s*(.+?)\s*(?:\.(?:\s|$)|constraints:|\n|$)",
        r"(?i)\bwith:\s*(.+?)\s*(?:\.(?:\s|$)|constraints:|\n|$)",
        r"(?i)\bingredients:\s*(.+?)\s*(?:\.(?:\s|$)|constraints:|\n|$)",
    ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

static CONSTRAINTS_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\bconstraints:\s*(.+)$").expect("valid regex")
});

static NEGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:no|without)\s+([a-z][a-z-]*)").expect("valid regex")
});

// Words after "no" that do not name a restriction.
const NEGATION_FILLERS: &[&str] = &["more", "less", "longer", "than", "need", "matter"];

static CALORIE_CEILING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:under|below|less than|no more than|max|maximum|at most)\s+\d+\s*(?:kcal|calories|calorie|cals|cal)\b"
    ).expect("valid regex")
});

const DIET_LABELS: &[&str] = &[
    "vegetarian",
    "vegan",
    "pescatarian",
    "keto",
    "paleo",
    "gluten-free",
    "dairy-free",
    "low-carb",
    "low-fat",
    "high-protein",
    "halal",
    "kosher",
];

static DIET_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    DIET_LABELS.iter()
        .map(|label| {
            // "gluten-free" also matches "gluten free" and "glutenfree"
            let body = label
                .split('-')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("[- ]?");
            let re = Regex::new(&format!(r"(?i)\b{}\b", body)).expect("valid regex");
            (*label, re)
        })
        .collect()
});

/// Runs the rule table top to bottom; the meal-plan rule always matches.
pub fn classify(message: &str) -> ChatRequest {
    let message = message.trim();
    for rule in RULES {
        if !(rule.predicate)(message) {
            continue;
        }
        if let Some(request) = (rule.extract)(message) {
            debug!("Message classified by rule '{}'", rule.name);
            return request;
        }
    }
    ChatRequest::MealPlan {
        query: message.to_string(),
        constraints: Vec::new(),
    }
}

fn always(_: &str) -> bool {
    true
}

fn looks_like_recipe(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("recipe") && (lower.contains(':') || lower.contains("using"))
}

fn extract_recipe(message: &str) -> Option<ChatRequest> {
    let ingredients = extract_ingredients(message);
    if ingredients.is_empty() {
        return None;
    }
    Some(ChatRequest::Recipe {
        ingredients,
        constraints: extract_constraint_suffix(message),
    })
}

fn extract_meal_plan(message: &str) -> Option<ChatRequest> {
    Some(ChatRequest::MealPlan {
        query: message.to_string(),
        constraints: scan_constraints(message),
    })
}

pub fn extract_ingredients(message: &str) -> Vec<String> {
    INGREDIENT_PATTERNS.iter()
        .find_map(|re| re.captures(message).and_then(|c| c.get(1)))
        .map(|m| split_list(m.as_str()))
        .unwrap_or_default()
}

pub fn extract_constraint_suffix(message: &str) -> Vec<Constraint> {
    CONSTRAINTS_SUFFIX.captures(message)
        .and_then(|c| c.get(1))
        .map(|m| {
            split_list(m.as_str())
                .into_iter()
                .map(Constraint)
                .collect()
        })
        .unwrap_or_default()
}

/// Collects negations, calorie ceilings and diet labels, in that order.
pub fn scan_constraints(message: &str) -> Vec<Constraint> {
    let mut found: Vec<Constraint> = Vec::new();
    let mut push = |text: &str| {
        let text = text.trim();
        if !text.is_empty() && !found.iter().any(|c| c.0.eq_ignore_ascii_case(text)) {
            found.push(Constraint(text.to_string()));
        }
    };

    for caps in NEGATION.captures_iter(message) {
        let object = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        if NEGATION_FILLERS.contains(&object.as_str()) {
            continue;
        }
        if let Some(m) = caps.get(0) {
            push(m.as_str());
        }
    }
    for m in CALORIE_CEILING.find_iter(message) {
        push(m.as_str());
    }
    for (label, re) in DIET_PATTERNS.iter() {
        // "non-vegetarian" is not "vegetarian"
        let affirmed = re.find_iter(message).any(|m| !message[..m.start()].ends_with('-'));
        if affirmed {
            push(*label);
        }
    }
    found
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().trim_end_matches('.').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(constraints: &[Constraint]) -> Vec<&str> {
        constraints
            .iter()
            .map(|c| c.as_str())
            .collect()
    }

    #[test]
    fn using_colon_makes_recipe_request() {
        let request = classify("Generate a recipe using: chicken, broccoli");
        assert_eq!(request, ChatRequest::Recipe {
            ingredients: vec!["chicken".to_string(), "broccoli".to_string()],
            constraints: vec![],
        });
    }

    #[test]
    fn recipe_constraints_come_from_suffix() {
        let request = classify("Recipe with: tofu, rice, spinach. Constraints: vegan, under 500 calories");
        match request {
            ChatRequest::Recipe { ingredients, constraints } => {
                assert_eq!(ingredients, vec!["tofu", "rice", "spinach"]);
                assert_eq!(texts(&constraints), vec!["vegan", "under 500 calories"]);
            }
            other => panic!("expected recipe, got {:?}", other),
        }
    }

    #[test]
    fn ingredients_list_stops_at_constraints_marker() {
        let request = classify("recipe ingredients: eggs, milk constraints: no gluten");
        match request {
            ChatRequest::Recipe { ingredients, constraints } => {
                assert_eq!(ingredients, vec!["eggs", "milk"]);
                assert_eq!(texts(&constraints), vec!["no gluten"]);
            }
            other => panic!("expected recipe, got {:?}", other),
        }
    }

    #[test]
    fn decimal_amounts_do_not_end_the_list() {
        let ingredients = extract_ingredients("recipe using: 1.5 cups rice, 2 eggs");
        assert_eq!(ingredients, vec!["1.5 cups rice", "2 eggs"]);
    }

    #[test]
    fn recipe_without_list_falls_back_to_plan() {
        let request = classify("Give me a recipe using whatever is in my fridge");
        assert!(matches!(request, ChatRequest::MealPlan { .. }));
    }

    #[test]
    fn plan_constraints_are_scanned() {
        let request = classify("Dinner ideas: no dairy, under 400 calories, vegan");
        match request {
            ChatRequest::MealPlan { query, constraints } => {
                assert_eq!(query, "Dinner ideas: no dairy, under 400 calories, vegan");
                let found = texts(&constraints);
                assert!(found.contains(&"no dairy"));
                assert!(found.contains(&"under 400 calories"));
                assert!(found.contains(&"vegan"));
            }
            other => panic!("expected meal plan, got {:?}", other),
        }
    }

    #[test]
    fn diet_labels_need_word_boundaries() {
        let found = scan_constraints("I love vegetables and ketones");
        assert!(found.is_empty());
        let found = scan_constraints("something Gluten Free and low carb");
        assert_eq!(texts(&found), vec!["gluten-free", "low-carb"]);
    }

    #[test]
    fn duplicates_are_collapsed() {
        let found = scan_constraints("no nuts please, really No Nuts, vegan vegan");
        assert_eq!(texts(&found), vec!["no nuts", "vegan"]);
    }

    #[test]
    fn hyphenated_negations_are_not_diet_labels() {
        let found = scan_constraints("A non-vegetarian dinner, no more than 500 calories");
        assert_eq!(texts(&found), vec!["no more than 500 calories"]);

        let found = scan_constraints("non-vegan starter and a vegan main");
        assert_eq!(texts(&found), vec!["vegan"]);
    }

    #[test]
    fn plain_question_has_no_constraints() {
        let request = classify("   What should I cook tonight?  ");
        assert_eq!(request, ChatRequest::MealPlan {
            query: "What should I cook tonight?".to_string(),
            constraints: vec![],
        });
    }
}

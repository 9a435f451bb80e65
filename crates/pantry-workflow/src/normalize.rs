//! Response-shape decoding for the two backend endpoints.
//!
//! The services are loose about what they return: detections may be objects
//! or bare strings, `recipes` may be a list or a single value, recipe fields
//! may be lists or newline-separated strings. Everything is decoded here, once,
//! into the crate's typed model.
use serde_json::Value;

use crate::errors::WorkflowError;
use crate::model::{Ingredient, RecipeItem, StructuredRecipe};

const NAME_KEYS: [&str; 3] = ["class", "name", "label"];
const UNTITLED_RECIPE: &str = "Untitled recipe";

/// A decoded value plus the shape problem that had to be papered over, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    /// Always a `WorkflowError::MalformedResponse` when set.
    pub malformed: Option<WorkflowError>,
}

impl<T> Normalized<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            malformed: None,
        }
    }

    fn recovered(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            malformed: Some(WorkflowError::MalformedResponse(message.into())),
        }
    }

    /// Fails instead of accepting a recovered value.
    pub fn into_strict(self) -> Result<T, WorkflowError> {
        match self.malformed {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

/// Decodes the `/api/upload` body into ordered detections.
///
/// Accepts `{ingredients: [...]}` and, leniently, a bare list.
pub fn decode_detections(body: &Value) -> Normalized<Vec<Ingredient>> {
    let items = match body.get("ingredients").or(body.as_array().map(|_| body)) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => {
            return Normalized::recovered(Vec::new(), "upload response has no ingredients list");
        }
        Some(other) => {
            return Normalized::recovered(
                vec![decode_ingredient(other)],
                "upload response ingredients is not a list",
            );
        }
    };
    Normalized::clean(items.iter().map(decode_ingredient).collect())
}

/// Names sent to recipe generation: one per detection, in detection order.
pub fn ingredient_names(ingredients: &[Ingredient]) -> Vec<String> {
    ingredients.iter().map(|i| i.name.clone()).collect()
}

fn decode_ingredient(value: &Value) -> Ingredient {
    let name = NAME_KEYS
        .iter()
        .find_map(|key| {
            value
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| coerce_text(value));
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite() && (0.0..=1.0).contains(c));
    Ingredient { name, confidence }
}

/// Decodes the `/api/recipes` body.
///
/// A list is adopted element-wise. Any other value under `recipes`,
/// `null` included, is wrapped as a single-element list and flagged as
/// malformed. Only an absent field yields an empty list.
pub fn decode_recipes(body: &Value) -> Normalized<Vec<RecipeItem>> {
    match body.get("recipes") {
        Some(Value::Array(items)) => Normalized::clean(items.iter().map(decode_recipe).collect()),
        None => match body {
            Value::Array(items) => Normalized::recovered(
                items.iter().map(decode_recipe).collect(),
                "recipe response is a bare list",
            ),
            _ => Normalized::recovered(Vec::new(), "recipe response has no recipes field"),
        },
        Some(other) => Normalized::recovered(
            vec![decode_recipe(other)],
            "recipes is not a list; showing it as a single recipe",
        ),
    }
}

/// Decodes one recipe element: strings stay raw, objects become structured.
pub fn decode_recipe(value: &Value) -> RecipeItem {
    let Value::Object(fields) = value else {
        return RecipeItem::Raw(coerce_text(value));
    };
    let name = ["name", "title"]
        .iter()
        .find_map(|key| {
            fields
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .unwrap_or(UNTITLED_RECIPE)
        .to_string();
    let ingredients_used = ["ingredients", "ingredients_used", "ingredientsUsed"]
        .iter()
        .find_map(|key| fields.get(*key))
        .map(text_list)
        .unwrap_or_default();
    let instructions = ["instructions", "steps"]
        .iter()
        .find_map(|key| fields.get(*key))
        .map(instruction_steps)
        .unwrap_or_default();
    RecipeItem::Structured(StructuredRecipe {
        name,
        ingredients_used,
        instructions,
    })
}

fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(coerce_text).collect(),
        Value::Null => Vec::new(),
        other => vec![coerce_text(other)],
    }
}

fn instruction_steps(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => text
            .split('\n')
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        other => text_list(other),
    }
}

/// String form of an arbitrary JSON value; strings are taken unquoted.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detections_keep_order_and_confidence() {
        let body = json!({"ingredients": [
            {"class": "tomato", "confidence": 0.9},
            {"class": "egg", "confidence": 0.5},
            {"class": "tomato", "confidence": 0.4}
        ]});
        let decoded = decode_detections(&body).into_strict().expect("clean");
        assert_eq!(
            ingredient_names(&decoded),
            vec!["tomato".to_string(), "egg".into(), "tomato".into()]
        );
        assert_eq!(decoded[0].confidence, Some(0.9));
    }

    #[test]
    fn detections_without_class_are_coerced_to_text() {
        let body = json!({"ingredients": ["basil", 42, {"confidence": 0.3}, {"class": ""}]});
        let decoded = decode_detections(&body).value;
        let names = ingredient_names(&decoded);
        assert_eq!(names[0], "basil");
        assert_eq!(names[1], "42");
        assert_eq!(names[2], r#"{"confidence":0.3}"#);
        assert_eq!(names[3], r#"{"class":""}"#);
        assert_eq!(decoded[2].confidence, Some(0.3));
        assert_eq!(decoded[0].confidence, None);
    }

    #[test]
    fn out_of_range_confidence_is_unknown() {
        let body = json!({"ingredients": [{"class": "milk", "confidence": 1.7}, {"class": "rice", "confidence": "high"}]});
        let decoded = decode_detections(&body).value;
        assert_eq!(decoded[0].confidence, None);
        assert_eq!(decoded[1].confidence, None);
    }

    #[test]
    fn missing_ingredients_is_malformed_and_empty() {
        let decoded = decode_detections(&json!({"message": "ok"}));
        assert!(decoded.value.is_empty());
        assert!(matches!(
            decoded.malformed,
            Some(WorkflowError::MalformedResponse(_))
        ));
    }

    #[test]
    fn recipe_list_is_adopted_with_mixed_elements() {
        let body = json!({"recipes": [
            "Tomato Soup",
            {"name": "Salad", "ingredients": "tomato", "instructions": ["Chop", "Toss"]}
        ]});
        let decoded = decode_recipes(&body).into_strict().expect("clean");
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], RecipeItem::Raw("Tomato Soup".into()));
        let salad = decoded[1].as_structured().expect("structured");
        assert_eq!(salad.ingredients_used, vec!["tomato".to_string()]);
        assert_eq!(salad.instructions, vec!["Chop".to_string(), "Toss".into()]);
    }

    #[test]
    fn single_object_recipe_is_wrapped() {
        let body = json!({"recipes": {"name": "Omelette", "ingredients": ["egg"], "instructions": "Beat eggs\r\nCook\n"}});
        let decoded = decode_recipes(&body);
        assert!(decoded.malformed.is_some());
        assert_eq!(
            decoded.value,
            vec![RecipeItem::Structured(StructuredRecipe {
                name: "Omelette".into(),
                ingredients_used: vec!["egg".into()],
                instructions: vec!["Beat eggs".into(), "Cook".into()],
            })]
        );
    }

    #[test]
    fn single_string_recipe_is_wrapped_verbatim() {
        let decoded = decode_recipes(&json!({"recipes": "1. Boil water\n2. Add pasta"}));
        assert_eq!(
            decoded.value,
            vec![RecipeItem::Raw("1. Boil water\n2. Add pasta".into())]
        );
        assert!(decoded.into_strict().is_err());
    }

    #[test]
    fn missing_recipes_field_yields_nothing() {
        let decoded = decode_recipes(&json!({"error": null}));
        assert!(decoded.value.is_empty());
        assert!(decoded.malformed.is_some());
    }

    #[test]
    fn null_recipes_is_wrapped_as_one_item() {
        let decoded = decode_recipes(&json!({"recipes": null}));
        assert_eq!(decoded.value, vec![RecipeItem::Raw("null".into())]);
        assert!(decoded.malformed.is_some());
    }

    #[test]
    fn blank_name_falls_back_to_title() {
        let item = decode_recipe(&json!({"name": "  ", "title": "Frittata"}));
        assert_eq!(item.as_structured().map(|r| r.name.as_str()), Some("Frittata"));
    }

    #[test]
    fn recipe_without_name_gets_placeholder() {
        let item = decode_recipe(&json!({"instructions": 3}));
        let recipe = item.as_structured().expect("structured");
        assert_eq!(recipe.name, UNTITLED_RECIPE);
        assert_eq!(recipe.instructions, vec!["3".to_string()]);
        assert!(recipe.ingredients_used.is_empty());
    }
}

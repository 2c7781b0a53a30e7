//! Property-based tests for coercion, enum membership and dirty tracking.

use proptest::prelude::*;
use recordkit_model::{FieldConfig, ModelConfig, ModelType, Value, define};

const STATES: [&str; 3] = ["draft", "published", "archived"];

fn article_type() -> ModelType {
    define(
        "Article",
        ModelConfig::new()
            .field("title", FieldConfig::string())
            .field("views", FieldConfig::number())
            .field("pinned", FieldConfig::boolean())
            .field("state", FieldConfig::enumeration(STATES).with_default("draft")),
    )
    .unwrap()
}

/// Raw inputs kept free of `Rc` so the strategies stay thread-safe.
#[derive(Debug, Clone)]
enum Raw {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Raw {
    fn value(&self) -> Value {
        match self {
            Self::Undefined => Value::Undefined,
            Self::Null => Value::Null,
            Self::Bool(b) => Value::from(*b),
            Self::Number(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

fn raw_strategy() -> impl Strategy<Value = Raw> {
    prop_oneof![
        Just(Raw::Undefined),
        Just(Raw::Null),
        any::<bool>().prop_map(Raw::Bool),
        any::<f64>().prop_map(Raw::Number),
        (-1000i64..1000).prop_map(|n| Raw::Number(n as f64)),
        "[a-z0-9 .]{0,12}".prop_map(Raw::Text),
    ]
}

proptest! {
    #[test]
    fn number_field_matches_numeric_coercion(raw in raw_strategy().prop_map(|raw| raw.value())) {
        let mut article = article_type().create_default().unwrap();
        article.set("views", raw.clone()).unwrap();

        let expected = if raw.is_truthy() { raw.to_number() } else { 0.0 };
        let expected = if expected.is_nan() { 0.0 } else { expected };
        prop_assert_eq!(article.get("views"), Some(Value::Number(expected)));
    }

    #[test]
    fn boolean_field_is_truthiness(raw in raw_strategy().prop_map(|raw| raw.value())) {
        let mut article = article_type().create_default().unwrap();
        article.set("pinned", raw.clone()).unwrap();
        prop_assert_eq!(article.get("pinned"), Some(Value::Bool(raw.is_truthy())));
    }

    #[test]
    fn string_field_is_never_non_string(raw in raw_strategy().prop_map(|raw| raw.value())) {
        let mut article = article_type().create_default().unwrap();
        article.set("title", raw.clone()).unwrap();
        let title = article.get("title").unwrap();
        prop_assert!(title.as_str().is_some());
        if !raw.is_truthy() {
            prop_assert_eq!(title, Value::from(""));
        }
    }

    #[test]
    fn enum_members_are_accepted(index in 0usize..STATES.len()) {
        let mut article = article_type().create_default().unwrap();
        article.set("state", STATES[index]).unwrap();
        prop_assert_eq!(article.get("state"), Some(Value::from(STATES[index])));
    }

    #[test]
    fn enum_non_members_are_rejected(word in "[a-z]{1,10}") {
        prop_assume!(!STATES.contains(&word.as_str()));
        let mut article = article_type().create(serde_json::json!({"state": "published"})).unwrap();
        prop_assert!(article.set("state", word).is_err());
        prop_assert_eq!(article.get("state"), Some(Value::from("published")));
    }

    #[test]
    fn reassigning_current_values_never_dirties(raw in raw_strategy().prop_map(|raw| raw.value())) {
        let mut article = article_type().create(serde_json::json!({})).unwrap();
        article.set_all([("views", raw.clone()), ("title", raw)]).unwrap();
        let before = article.dirty().cloned();

        for name in ["title", "views", "pinned", "state"] {
            let current = article.get(name).unwrap();
            article.set(name, current).unwrap();
        }
        prop_assert_eq!(article.dirty().cloned(), before);
    }

    #[test]
    fn differing_write_is_recorded_as_dirty(n in -1000i64..1000) {
        let mut article = article_type().create_default().unwrap();
        prop_assume!(n != 0);
        article.set("views", n).unwrap();
        let dirty = article.dirty().unwrap();
        prop_assert_eq!(dirty.get("views"), Some(&Value::from(n)));
    }
}

//! Declarative model configuration.
//!
//! Model types can be declared in JSON, e.g.
//!
//! ```json
//! {
//!   "idField": "id",
//!   "fields": {
//!     "id": { "type": "number" },
//!     "status": { "type": "enum", "values": ["open", "closed"], "default": "open" },
//!     "address": { "type": "Address" },
//!     "notes": true
//!   }
//! }
//! ```
//!
//! `type` is one of the primitive names, `"enum"`, or the name of a model or
//! custom type already registered in the [`TypeRegistry`]. Derive functions,
//! validators and behaviors cannot be expressed in JSON; attach them to the
//! [`ModelConfig`] returned by [`TypeRegistry::config_from_json`].

use crate::error::{Error, Result};
use crate::field::{CustomType, FieldKind, Primitive};
use crate::schema::{FieldConfig, ModelConfig, ModelType, define};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// A JSON model declaration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDecl {
    #[serde(default)]
    pub fields: IndexMap<String, FieldEntry>,
    #[serde(default, rename = "idField", alias = "id_field")]
    pub id_field: Option<String>,
}

/// One entry of `fields`: either a bare flag (`"notes": true`) declaring an
/// untyped field, or a full declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry {
    Flag(bool),
    Decl(FieldDecl),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldDecl {
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// `None` when the key is missing; an explicit `null` is kept.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<serde_json::Value>,
    #[serde(default, alias = "enumValues")]
    pub values: Option<Vec<serde_json::Value>>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Named model and custom types that declarations may refer to.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    models: HashMap<String, ModelType>,
    customs: HashMap<String, CustomType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `model_type` available under its own name.
    pub fn register_model(&mut self, model_type: ModelType) {
        self.models.insert(model_type.name().to_string(), model_type);
    }

    /// Makes `custom` available under its own name.
    pub fn register_custom(&mut self, custom: CustomType) {
        self.customs.insert(custom.name().to_string(), custom);
    }

    pub fn model(&self, name: &str) -> Option<&ModelType> {
        self.models.get(name)
    }

    pub fn custom(&self, name: &str) -> Option<&CustomType> {
        self.customs.get(name)
    }

    /// Resolves a declared type name. Model types win over custom types of
    /// the same name.
    pub fn resolve_kind(&self, decl: &FieldDecl) -> Result<FieldKind> {
        let Some(type_name) = decl.type_name.as_deref() else {
            return Ok(FieldKind::Any);
        };
        Ok(match type_name {
            "any" => FieldKind::Any,
            "boolean" => FieldKind::Primitive(Primitive::Boolean),
            "string" => FieldKind::Primitive(Primitive::String),
            "number" => FieldKind::Primitive(Primitive::Number),
            "enum" => FieldKind::Enum(
                decl.values
                    .iter()
                    .flatten()
                    .cloned()
                    .map(Value::from)
                    .collect(),
            ),
            other => {
                if let Some(model_type) = self.models.get(other) {
                    FieldKind::Nested(model_type.clone())
                } else if let Some(custom) = self.customs.get(other) {
                    FieldKind::Custom(custom.clone())
                } else {
                    return Err(Error::UnknownType {
                        name: other.to_string(),
                    });
                }
            }
        })
    }

    /// Builds a [`ModelConfig`] from a parsed declaration.
    pub fn config_from_decl(&self, decl: &ModelDecl) -> Result<ModelConfig> {
        let mut config = ModelConfig::new();
        for (name, entry) in &decl.fields {
            let field = match entry {
                FieldEntry::Flag(_) => FieldConfig::any(),
                FieldEntry::Decl(decl) => {
                    let field = FieldConfig::of_kind(self.resolve_kind(decl)?);
                    match &decl.default {
                        Some(default) => field.with_default(Value::from(default.clone())),
                        None => field,
                    }
                }
            };
            config = config.field(name.clone(), field);
        }
        if let Some(id_field) = &decl.id_field {
            config = config.id_field(id_field.clone());
        }
        Ok(config)
    }

    /// Parses a JSON declaration into a [`ModelConfig`].
    pub fn config_from_json(&self, json: serde_json::Value) -> Result<ModelConfig> {
        let decl: ModelDecl = serde_json::from_value(json)?;
        self.config_from_decl(&decl)
    }

    /// Compiles a JSON declaration and registers the resulting type, so
    /// later declarations can nest it.
    pub fn define_json(&mut self, type_name: &str, json: serde_json::Value) -> Result<ModelType> {
        let config = self.config_from_json(json)?;
        self.define(type_name, config)
    }

    /// Same as [`TypeRegistry::define_json`] for JSON text.
    pub fn define_str(&mut self, type_name: &str, text: &str) -> Result<ModelType> {
        let decl: ModelDecl = serde_json::from_str(text)?;
        let config = self.config_from_decl(&decl)?;
        self.define(type_name, config)
    }

    /// Compiles `config` and registers the resulting type.
    pub fn define(&mut self, type_name: &str, config: ModelConfig) -> Result<ModelType> {
        let model_type = define(type_name, config)?;
        self.register_model(model_type.clone());
        Ok(model_type)
    }
}

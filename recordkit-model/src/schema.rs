//! Schema compilation: declarative configuration → reusable [`ModelType`].

use crate::error::{Error, Result};
use crate::field::{CustomType, DeriveFn, FieldDefinition, FieldKind, Primitive, Snapshot, ValidateFn};
use crate::model::Model;
use crate::value::{Record, Value};
use indexmap::IndexMap;
use recordkit_events::{Emitter, EventBus};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// An instance method. Receives the instance it was called on.
pub type MethodFn = Rc<dyn Fn(&mut Model, &[Value]) -> Result<Value>>;

/// A type-level helper. Receives the model type it was declared on.
pub type HelperFn = Rc<dyn Fn(&ModelType, &[Value]) -> Result<Value>>;

/// Declaration of one field, built up before compilation.
#[derive(Clone, Default)]
pub struct FieldConfig {
    kind: FieldKind,
    default: Value,
    derive: Option<DeriveFn>,
    validate: Option<ValidateFn>,
}

impl FieldConfig {
    pub fn of_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// An untyped field; values are stored as given.
    pub fn any() -> Self {
        Self::of_kind(FieldKind::Any)
    }

    pub fn boolean() -> Self {
        Self::of_kind(FieldKind::Primitive(Primitive::Boolean))
    }

    pub fn string() -> Self {
        Self::of_kind(FieldKind::Primitive(Primitive::String))
    }

    pub fn number() -> Self {
        Self::of_kind(FieldKind::Primitive(Primitive::Number))
    }

    /// A field restricted to `values`.
    pub fn enumeration<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::of_kind(FieldKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn custom(custom: CustomType) -> Self {
        Self::of_kind(FieldKind::Custom(custom))
    }

    pub fn nested(model_type: &ModelType) -> Self {
        Self::of_kind(FieldKind::Nested(model_type.clone()))
    }

    /// Value used when an instance is created without one for this field.
    /// Goes through coercion like any other write.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Makes the field computed: every read calls `derive`.
    #[must_use]
    pub fn derive(mut self, derive: impl Fn(&Snapshot) -> Value + 'static) -> Self {
        self.derive = Some(Rc::new(derive));
        self
    }

    #[must_use]
    pub fn validate(mut self, validate: impl Fn(&Value) -> bool + 'static) -> Self {
        self.validate = Some(Rc::new(validate));
        self
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    fn compile(self, name: String) -> FieldDefinition {
        FieldDefinition {
            name,
            kind: self.kind,
            default: self.default,
            derive: self.derive,
            validate: self.validate,
        }
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("derive", &self.derive.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Declaration of a whole model type. Field order is declaration order.
#[derive(Clone, Default)]
pub struct ModelConfig {
    fields: IndexMap<String, FieldConfig>,
    id_field: Option<String>,
    methods: IndexMap<String, MethodFn>,
    helpers: IndexMap<String, HelperFn>,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field. Redeclaring a name replaces it in place.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, config: FieldConfig) -> Self {
        self.fields.insert(name.into(), config);
        self
    }

    /// Adjusts an already declared field, or declares an untyped one first.
    #[must_use]
    pub fn map_field(
        mut self,
        name: impl Into<String>,
        update: impl FnOnce(FieldConfig) -> FieldConfig,
    ) -> Self {
        let name = name.into();
        let config = self.fields.get(&name).cloned().unwrap_or_default();
        self.fields.insert(name, update(config));
        self
    }

    /// Names the field returned by [`Model::id`]. It must be declared.
    #[must_use]
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = Some(name.into());
        self
    }

    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&mut Model, &[Value]) -> Result<Value> + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Rc::new(method));
        self
    }

    #[must_use]
    pub fn helper(
        mut self,
        name: impl Into<String>,
        helper: impl Fn(&ModelType, &[Value]) -> Result<Value> + 'static,
    ) -> Self {
        self.helpers.insert(name.into(), Rc::new(helper));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("fields", &self.fields)
            .field("id_field", &self.id_field)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub(crate) struct Schema {
    pub(crate) type_name: String,
    pub(crate) fields: IndexMap<String, Rc<FieldDefinition>>,
    pub(crate) id_field: Option<String>,
    pub(crate) methods: IndexMap<String, MethodFn>,
    pub(crate) helpers: IndexMap<String, HelperFn>,
}

/// A compiled model type. Cheap to clone; clones share the same schema.
#[derive(Clone)]
pub struct ModelType(Rc<Schema>);

/// Compiles `config` into a model type named `type_name`.
///
/// Fails only when the configured id field is not a declared field.
pub fn define(type_name: impl Into<String>, config: ModelConfig) -> Result<ModelType> {
    let type_name = type_name.into();
    if let Some(id_field) = &config.id_field {
        if !config.fields.contains_key(id_field) {
            return Err(Error::UnknownIdField {
                type_name,
                field: id_field.clone(),
            });
        }
    }

    let fields: IndexMap<String, Rc<FieldDefinition>> = config
        .fields
        .into_iter()
        .map(|(name, field)| (name.clone(), Rc::new(field.compile(name))))
        .collect();

    debug!(
        "Defined model type {} ({} fields, {} methods)",
        type_name,
        fields.len(),
        config.methods.len()
    );

    Ok(ModelType(Rc::new(Schema {
        type_name,
        fields,
        id_field: config.id_field,
        methods: config.methods,
        helpers: config.helpers,
    })))
}

impl ModelType {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.type_name
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.0.fields.values().map(|def| def.as_ref())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.0.fields.get(name).map(|def| def.as_ref())
    }

    pub fn id_field(&self) -> Option<&str> {
        self.0.id_field.as_deref()
    }

    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.0.methods.contains_key(name)
    }

    #[must_use]
    pub fn has_helper(&self, name: &str) -> bool {
        self.0.helpers.contains_key(name)
    }

    /// Creates an instance. A `Map` supplies initial values by field name, a
    /// `Model` supplies its raw property view, anything else supplies none.
    pub fn create(&self, initial: impl Into<Value>) -> Result<Model> {
        self.create_with_emitter(initial, Box::new(EventBus::new()))
    }

    /// Creates an instance with defaults only.
    pub fn create_default(&self) -> Result<Model> {
        self.create(Value::Undefined)
    }

    /// Creates an instance that publishes its change events through `emitter`.
    pub fn create_with_emitter(
        &self,
        initial: impl Into<Value>,
        emitter: Box<dyn Emitter<Record>>,
    ) -> Result<Model> {
        Model::construct(self.clone(), initial.into(), emitter)
    }

    /// Calls a type-level helper.
    pub fn call_helper(&self, name: &str, args: &[Value]) -> Result<Value> {
        let helper = self
            .0
            .helpers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownHelper {
                type_name: self.0.type_name.clone(),
                name: name.to_string(),
            })?;
        helper(self, args)
    }

    /// Whether both handles refer to the same compiled type.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn schema(&self) -> &Schema {
        &self.0
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.0.type_name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("id_field", &self.0.id_field)
            .finish()
    }
}

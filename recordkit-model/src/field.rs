//! Field definitions and per-instance field state.

use crate::coerce::coerce;
use crate::error::{Error, Result};
use crate::schema::ModelType;
use crate::value::{Record, Value};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Computes a field's value from the current non-computed sibling values.
pub type DeriveFn = Rc<dyn Fn(&Snapshot) -> Value>;

/// Decides whether a field's current value is acceptable.
pub type ValidateFn = Rc<dyn Fn(&Value) -> bool>;

/// The built-in scalar field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    String,
    Number,
}

impl Primitive {
    /// The name used for this type in declarative configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

/// A named, user-supplied constructor for opaque field values.
#[derive(Clone)]
pub struct CustomType {
    name: Rc<str>,
    construct: Rc<dyn Fn(Value) -> Value>,
}

impl CustomType {
    pub fn new(name: &str, construct: impl Fn(Value) -> Value + 'static) -> Self {
        Self {
            name: name.into(),
            construct: Rc::new(construct),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the constructor on a raw value.
    pub fn construct(&self, raw: Value) -> Value {
        (self.construct)(raw)
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomType").field(&self.name).finish()
    }
}

/// A field's declared type, resolved once when the schema is compiled.
#[derive(Debug, Clone, Default)]
pub enum FieldKind {
    /// Untyped: values are stored as given.
    #[default]
    Any,
    Primitive(Primitive),
    /// Only the listed values may be assigned; they are stored unchanged.
    Enum(Vec<Value>),
    Custom(CustomType),
    /// Values are coerced into owned instances of another model type.
    Nested(ModelType),
}

/// The compiled, immutable description of one field.
pub struct FieldDefinition {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) default: Value,
    pub(crate) derive: Option<DeriveFn>,
    pub(crate) validate: Option<ValidateFn>,
}

impl FieldDefinition {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The configured default; `Undefined` when none was given.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether reads come from the derive function instead of storage.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.derive.is_some()
    }

    #[must_use]
    pub fn has_validator(&self) -> bool {
        self.validate.is_some()
    }

    /// Enum members for enum fields, `None` otherwise.
    pub fn enum_values(&self) -> Option<&[Value]> {
        match &self.kind {
            FieldKind::Enum(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("computed", &self.is_computed())
            .field("validated", &self.has_validator())
            .finish()
    }
}

/// Non-computed field values of one instance, collected at read time and
/// handed to derive functions.
#[derive(Debug, Clone, Default)]
pub struct Snapshot(Record);

impl Snapshot {
    /// Collects the current value of every non-computed field.
    pub fn of(fields: &[Field]) -> Self {
        Self(
            fields
                .iter()
                .filter(|field| !field.is_computed())
                .map(|field| (field.name().to_string(), field.value.clone()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Owned value of `name`, `Undefined` when absent.
    #[must_use]
    pub fn value(&self, name: &str) -> Value {
        self.0.get(name).cloned().unwrap_or_default()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn as_record(&self) -> &Record {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One named slot of a live instance. All reads and writes go through it.
#[derive(Debug)]
pub struct Field {
    def: Rc<FieldDefinition>,
    raw_value: Value,
    value: Value,
}

impl Field {
    /// Creates an unset field. Values arrive through [`Field::set`].
    pub fn new(def: Rc<FieldDefinition>) -> Self {
        Self {
            def,
            raw_value: Value::Undefined,
            value: Value::Undefined,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    #[must_use]
    pub fn definition(&self) -> &FieldDefinition {
        &self.def
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.def.is_computed()
    }

    /// The supplied value unless it is missing or `Undefined`, else the default.
    pub fn initial_value(&self, supplied: Option<&Value>) -> Value {
        match supplied {
            Some(value) if !value.is_undefined() => value.clone(),
            _ => self.def.default.clone(),
        }
    }

    /// The last raw value written.
    #[must_use]
    pub fn raw_value(&self) -> &Value {
        &self.raw_value
    }

    /// The coerced backing storage. For computed fields this is never what
    /// [`Field::get`] returns.
    #[must_use]
    pub fn stored_value(&self) -> &Value {
        &self.value
    }

    /// Current value. Computed fields re-run their derive function against
    /// the non-computed `siblings` on every call.
    pub fn get(&self, siblings: &[Field]) -> Value {
        match &self.def.derive {
            Some(derive) => derive(&Snapshot::of(siblings)),
            None => self.value.clone(),
        }
    }

    /// Writes `raw` and returns the new coerced value if it differs from the
    /// previous one, `None` for a no-op write.
    ///
    /// Enum fields reject non-members before anything is stored.
    pub fn set(&mut self, raw: Value) -> Result<Option<Value>> {
        if let FieldKind::Enum(allowed) = &self.def.kind {
            if !allowed.contains(&raw) {
                debug!("Rejected {} for enum field {}", raw, self.def.name);
                return Err(Error::EnumConstraintViolation {
                    field: self.def.name.clone(),
                    value: raw,
                    allowed: allowed.clone(),
                });
            }
        }

        let value = coerce(&self.def.kind, &raw)?;
        self.raw_value = raw;
        if value == self.value {
            return Ok(None);
        }
        self.value = value;
        Ok(Some(self.value.clone()))
    }

    /// Applies the validator to the current value; fields without one are valid.
    pub fn is_valid(&self, siblings: &[Field]) -> bool {
        match &self.def.validate {
            Some(validate) => validate(&self.get(siblings)),
            None => true,
        }
    }
}

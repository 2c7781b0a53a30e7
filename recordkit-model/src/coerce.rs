//! Raw value → stored value conversion for each field kind.

use crate::error::Result;
use crate::field::{FieldKind, Primitive};
use crate::value::{ModelRef, Value};

/// Converts `raw` into the canonical stored value for `kind`.
///
/// Enum membership is not checked here; [`crate::Field::set`] does that
/// before coercing. The only failure is a nested model type rejecting one of
/// its own initial values.
pub fn coerce(kind: &FieldKind, raw: &Value) -> Result<Value> {
    Ok(match kind {
        FieldKind::Any | FieldKind::Enum(_) => raw.clone(),
        FieldKind::Primitive(primitive) => coerce_primitive(*primitive, raw),
        FieldKind::Custom(custom) => custom.construct(raw.clone()),
        FieldKind::Nested(model_type) => {
            Value::Model(ModelRef::new(model_type.create(raw.clone())?))
        }
    })
}

/// Scalar coercion. Total: every input maps to a value of the target type.
#[must_use]
pub fn coerce_primitive(primitive: Primitive, raw: &Value) -> Value {
    match primitive {
        Primitive::Boolean => Value::Bool(raw.is_truthy()),
        Primitive::String if raw.is_truthy() => Value::String(raw.to_string()),
        Primitive::String => Value::String(String::new()),
        Primitive::Number => {
            let n = if raw.is_truthy() { raw.to_number() } else { 0.0 };
            Value::Number(if n.is_nan() { 0.0 } else { n })
        }
    }
}

//! The dynamic value stored in every field.
//!
//! Coercion rules are defined in terms of loose-typed truthiness, string
//! conversion and number conversion, so `Value` carries those three
//! operations along with strict equality (`PartialEq`), which is what decides
//! whether a write counts as a change.

use crate::Model;
use indexmap::IndexMap;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// An ordered field-name → value mapping.
pub type Record = IndexMap<String, Value>;

/// A dynamically typed field value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value at all. Missing initial values and absent defaults are `Undefined`.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(Record),
    /// An instance of a nested model type.
    Model(ModelRef),
    /// A value produced by a custom type constructor.
    Object(Opaque),
}

impl Value {
    /// Wraps an arbitrary Rust value as an opaque object.
    pub fn object<T: Any>(value: T) -> Self {
        Self::Object(Opaque::new(value))
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Loose-typed truthiness. `Undefined`, `Null`, `false`, `0`, `-0`, `NaN`
    /// and the empty string are falsy; everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::List(_) | Self::Map(_) | Self::Model(_) | Self::Object(_) => true,
        }
    }

    /// Loose-typed numeric conversion. Anything without a numeric reading is `NaN`.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
            Self::List(_) => parse_number(&self.to_string()),
            Self::Map(_) | Self::Model(_) | Self::Object(_) => f64::NAN,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&ModelRef> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Opaque> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Converts to JSON. Non-finite numbers, `Undefined` and opaque objects become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Strict equality: primitives compare by value (`NaN` never equals itself),
/// models and opaque objects by identity, lists and maps element-wise.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Model(a), Self::Model(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Loose-typed string conversion, e.g. `4.0` prints as `4` and lists join with `,`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => f.write_str(s),
            Self::List(items) => f.write_str(&join(items, ",")),
            Self::Map(_) | Self::Model(_) | Self::Object(_) => f.write_str("[object Object]"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null | Self::Object(_) => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) if !n.is_finite() => serializer.serialize_none(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
            Self::Model(model) => model.serialize(serializer),
        }
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Joins items the way list-to-string conversion does: `Undefined` and
/// `Null` render as empty.
pub(crate) fn join(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Undefined | Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // exponent form with an explicit sign, e.g. 1e+21 and 1.5e-7
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        n.to_string()
    }
}

/// Digits after a `0x`/`0o`/`0b` prefix. No sign, no separators, at least one digit.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// Parses numeric text: surrounding whitespace ignored, empty text is 0,
/// decimal and exponent literals, `0x`/`0o`/`0b` prefixes and `Infinity`.
fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    match s {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&s[2..], radix);
    }

    // f64::from_str also accepts "inf" and "nan", which are not numeric text here
    if s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

// ── Handles ──────────────────────────────────────────────────────

/// Shared handle to a nested model instance.
///
/// Equality of two `Value::Model`s is handle identity, so re-coercing the
/// same raw input into a fresh instance always counts as a change.
#[derive(Clone)]
pub struct ModelRef(Rc<RefCell<Model>>);

impl ModelRef {
    pub fn new(model: Model) -> Self {
        Self(Rc::new(RefCell::new(model)))
    }

    /// Borrows the instance. Panics if it is currently borrowed mutably.
    pub fn borrow(&self) -> Ref<'_, Model> {
        self.0.borrow()
    }

    /// Mutably borrows the instance. Panics if it is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Model> {
        self.0.borrow_mut()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

thread_local! {
    /// Instances currently being serialized on this thread.
    static SERIALIZING: RefCell<Vec<*const RefCell<Model>>> = const { RefCell::new(Vec::new()) };
}

/// Pops the instance off `SERIALIZING` when serialization returns or unwinds.
struct SerializingGuard;

impl Drop for SerializingGuard {
    fn drop(&mut self) {
        SERIALIZING.with_borrow_mut(|active| {
            active.pop();
        });
    }
}

/// Serializes the instance's current values. An instance reachable from its
/// own fields, or one that is mutably borrowed, is an error.
impl Serialize for ModelRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ptr = Rc::as_ptr(&self.0);
        if SERIALIZING.with_borrow(|active| active.contains(&ptr)) {
            return Err(S::Error::custom("model instance contains itself"));
        }
        let model = self
            .0
            .try_borrow()
            .map_err(|_| S::Error::custom("model instance is mutably borrowed"))?;

        SERIALIZING.with_borrow_mut(|active| active.push(ptr));
        let _guard = SerializingGuard;
        model.serialize(serializer)
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(model) => fmt::Debug::fmt(&*model, f),
            Err(_) => f.write_str("ModelRef(<borrowed>)"),
        }
    }
}

/// A value produced by a custom type constructor. Never inspected by the engine.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Rc<dyn Any>,
}

impl Opaque {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Rc::new(value),
        }
    }

    /// Rust type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}

// ── Conversions ──────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Self::Number(n as f64)
            }
        })*
    };
}

from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Record> for Value {
    fn from(map: Record) -> Self {
        Self::Map(map)
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Self::Model(ModelRef::new(model))
    }
}

impl From<ModelRef> for Value {
    fn from(model: ModelRef) -> Self {
        Self::Model(model)
    }
}

impl From<Opaque> for Value {
    fn from(object: Opaque) -> Self {
        Self::Object(object)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_rejects_rust_only_spellings() {
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert!(parse_number("1_000").is_nan());
    }

    #[test]
    fn parse_number_accepts_prefixed_integers() {
        assert_eq!(parse_number("0x1F"), 31.0);
        assert_eq!(parse_number("0b101"), 5.0);
        assert_eq!(parse_number("0o17"), 15.0);
        assert!(parse_number("0x").is_nan());
        assert!(parse_number("0x+1").is_nan());
        assert!(parse_number("0b102").is_nan());
        assert_eq!(parse_number("0x10000000000000000"), 18_446_744_073_709_551_616.0);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn format_number_switches_to_exponent_at_the_edges() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
    }
}

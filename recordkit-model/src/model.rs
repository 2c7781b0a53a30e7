//! Live model instances.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::schema::ModelType;
use crate::value::{Record, Value};
use recordkit_events::{Emitter, SubscriptionId};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::trace;

/// The event published by [`Model::set`] when at least one field changed.
pub const CHANGE_EVENT: &str = "change";

/// One record of a [`ModelType`].
///
/// Holds one [`Field`] per declared field, the cumulative dirty mapping and
/// the raw-value property view, and publishes change events through an
/// injected [`Emitter`].
pub struct Model {
    model_type: ModelType,
    fields: Vec<Field>,
    props: Record,
    dirty: Record,
    id_field: Option<String>,
    emitter: Box<dyn Emitter<Record>>,
}

impl Model {
    pub(crate) fn construct(
        model_type: ModelType,
        initial: Value,
        emitter: Box<dyn Emitter<Record>>,
    ) -> Result<Self> {
        let initial = match initial {
            Value::Map(values) => values,
            Value::Model(other) => other.borrow().props().clone(),
            _ => Record::new(),
        };

        let fields = model_type
            .schema()
            .fields
            .values()
            .cloned()
            .map(Field::new)
            .collect();
        let mut model = Self {
            model_type,
            fields,
            props: Record::new(),
            dirty: Record::new(),
            id_field: None,
            emitter,
        };

        for index in 0..model.fields.len() {
            let field = &model.fields[index];
            let value = field.initial_value(initial.get(field.name()));
            model.apply(index, value)?;
        }

        model.dirty.clear();
        model.id_field = model.model_type.id_field().map(str::to_string);
        Ok(model)
    }

    #[must_use]
    pub fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.model_type.name()
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.model_type.schema().fields.get_index_of(name)
    }

    /// Current value of one field; `None` if no such field is declared.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.field_index(name)
            .map(|index| self.fields[index].get(&self.fields))
    }

    /// Current values of every field in declaration order.
    #[must_use]
    pub fn get_all(&self) -> Record {
        self.fields
            .iter()
            .map(|field| (field.name().to_string(), field.get(&self.fields)))
            .collect()
    }

    /// Writes one field. See [`Model::set_all`].
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Record> {
        self.set_all([(name, value.into())])
    }

    /// Writes several fields in iteration order and returns the ones whose
    /// coerced value changed.
    ///
    /// Unknown names are skipped. Changed fields are merged into the dirty
    /// mapping and, when there are any, published as one `change` event.
    ///
    /// Not atomic: if an enum field rejects its value, fields written earlier
    /// in the same call stay written (and dirty), no event is published, and
    /// the error is returned.
    pub fn set_all<I, K, V>(&mut self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut changed = Record::new();
        for (name, raw) in values {
            let name = name.into();
            let Some(index) = self.field_index(&name) else {
                continue;
            };
            match self.apply(index, raw.into()) {
                Ok(Some(value)) => {
                    changed.insert(name, value);
                }
                Ok(None) => {}
                Err(err) => {
                    self.mark_dirty(&changed);
                    return Err(err);
                }
            }
        }

        self.mark_dirty(&changed);
        if !changed.is_empty() {
            trace!(
                "{} changed: {:?}",
                self.model_type.name(),
                changed.keys().collect::<Vec<_>>()
            );
            self.trigger(CHANGE_EVENT, &changed);
        }
        Ok(changed)
    }

    /// Writes values from a `Map`; any other value writes nothing.
    pub fn set_values(&mut self, values: Value) -> Result<Record> {
        match values {
            Value::Map(values) => self.set_all(values),
            _ => Ok(Record::new()),
        }
    }

    fn apply(&mut self, index: usize, raw: Value) -> Result<Option<Value>> {
        let field = &mut self.fields[index];
        // the property view takes the raw value even when the field rejects it
        if self.props.get(field.name()) != Some(&raw) {
            self.props.insert(field.name().to_string(), raw.clone());
        }
        field.set(raw)
    }

    fn mark_dirty(&mut self, changed: &Record) {
        for (name, value) in changed {
            self.dirty.insert(name.clone(), value.clone());
        }
    }

    /// Current id value; `None` when the type has no id field.
    pub fn id(&self) -> Option<Value> {
        self.id_field.as_deref().and_then(|name| self.get(name))
    }

    /// Writes the id field and returns its new current value. A no-op
    /// returning `None` when the type has no id field.
    pub fn set_id(&mut self, value: impl Into<Value>) -> Result<Option<Value>> {
        let Some(name) = self.id_field.clone() else {
            return Ok(None);
        };
        self.set(&name, value)?;
        Ok(self.get(&name))
    }

    /// True when every field's validator accepts its current value.
    /// Every validator runs, even after one has failed.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.fields
            .iter()
            .filter(|field| field.definition().has_validator())
            .map(|field| field.is_valid(&self.fields))
            .fold(true, |all, ok| all && ok)
    }

    /// Fields changed since construction with their latest coerced values,
    /// or `None` when nothing has changed.
    pub fn dirty(&self) -> Option<&Record> {
        (!self.dirty.is_empty()).then_some(&self.dirty)
    }

    /// The last raw value assigned to `name`.
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// Raw values of every field, as last assigned.
    #[must_use]
    pub fn props(&self) -> &Record {
        &self.props
    }

    /// Calls an instance method declared on the model type.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let method = self
            .model_type
            .schema()
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownMethod {
                type_name: self.model_type.name().to_string(),
                name: name.to_string(),
            })?;
        method(self, args)
    }

    // ── Events ───────────────────────────────────────────────────

    /// Registers a handler for `event`.
    pub fn on(&mut self, event: &str, handler: impl FnMut(&Record) + 'static) -> SubscriptionId {
        self.emitter.subscribe(event, Box::new(handler))
    }

    /// Alias of [`Model::on`].
    pub fn bind(&mut self, event: &str, handler: impl FnMut(&Record) + 'static) -> SubscriptionId {
        self.on(event, handler)
    }

    /// Removes one handler, or all handlers of `event` when `id` is `None`.
    pub fn off(&mut self, event: &str, id: Option<SubscriptionId>) -> usize {
        self.emitter.unsubscribe(event, id)
    }

    /// Alias of [`Model::off`].
    pub fn unbind(&mut self, event: &str, id: Option<SubscriptionId>) -> usize {
        self.off(event, id)
    }

    /// Publishes `payload` to the handlers of `event`.
    pub fn trigger(&mut self, event: &str, payload: &Record) -> usize {
        self.emitter.publish(event, payload)
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.get_all().serialize(serializer)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("type", &self.model_type.name())
            .field("values", &self.get_all())
            .field("dirty", &self.dirty)
            .finish()
    }
}

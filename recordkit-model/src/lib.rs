//! Schema-driven mutable records.
//!
//! A model type is declared once with typed fields and instantiated many times:
//! - [`define`] / [`ModelConfig`] / [`FieldConfig`] — compile a declaration into a [`ModelType`]
//! - [`Model`] — one live record: get/set, id, validity, dirty tracking, change events
//! - [`Field`] — one typed slot, mediating every read and write through [`coerce`]
//! - [`Value`] — the dynamic value stored in fields, with loose-typed conversions
//! - [`TypeRegistry`] — declarative (JSON) model declarations resolved by type name
//!
//! Change events go through the [`recordkit_events::Emitter`] collaborator;
//! instances get an in-memory [`recordkit_events::EventBus`] unless one is
//! injected with [`ModelType::create_with_emitter`].
//!
//! Everything is single-threaded: instances and types are `Rc`-based and not `Send`.

mod coerce;
mod error;
mod field;
mod model;
mod registry;
mod schema;
mod value;

pub use coerce::{coerce, coerce_primitive};
pub use error::{Error, Result};
pub use field::{CustomType, DeriveFn, Field, FieldDefinition, FieldKind, Primitive, Snapshot, ValidateFn};
pub use model::{CHANGE_EVENT, Model};
pub use registry::{FieldDecl, FieldEntry, ModelDecl, TypeRegistry};
pub use schema::{FieldConfig, HelperFn, MethodFn, ModelConfig, ModelType, define};
pub use value::{ModelRef, Opaque, Record, Value};

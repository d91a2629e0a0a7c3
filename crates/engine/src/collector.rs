//! Value collection for blueprint inputs.
//!
//! Inputs write into a [`CollectedInputs`] as the user edits them. The shape
//! of the collected state follows the aggregation mode of the input that last
//! wrote to it: a direct input replaces the whole state with its value, a
//! keyed input stores its value under its id.

use std::io;
use std::path::PathBuf;

use hudl_types::{Blueprint, InputDescriptor, InputKind, InputMapping};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub mod file;
pub mod tag_list;

pub use file::{encode_bytes, encode_file_input};
pub use tag_list::TagListEditor;

/// Errors raised while recording input values.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("input '{input}' is keyed but the collected state holds a direct value")]
    ShapeConflict { input: String },

    #[error("unknown input '{id}'")]
    UnknownInput { id: String },

    #[error("input '{input}' expects {expected}")]
    InvalidValue { input: String, expected: String },

    #[error("failed to read file '{}' for input '{input}': {source}", .path.display())]
    FileRead {
        input: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CollectError {
    pub fn unknown_input(id: impl Into<String>) -> Self {
        Self::UnknownInput { id: id.into() }
    }

    pub fn invalid_value(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidValue {
            input: input.into(),
            expected: expected.into(),
        }
    }
}

/// Values collected for one session.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectedInputs {
    /// A direct input wrote last; this value is the whole payload.
    Direct(Value),
    /// Values keyed by input id.
    Keyed(Map<String, Value>),
}

impl Default for CollectedInputs {
    fn default() -> Self {
        Self::Keyed(Map::new())
    }
}

impl CollectedInputs {
    /// An empty keyed state, as before any user edit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the state from blueprint examples, in authoring order.
    ///
    /// Inputs with an `example` record it. Tag-list inputs without one record
    /// an empty list so the payload always carries the key.
    pub fn seeded(blueprint: &Blueprint) -> Result<Self, CollectError> {
        let mut inputs = Self::new();
        for descriptor in &blueprint.inputs {
            let seed = match (&descriptor.example, descriptor.r#type) {
                (Some(example), _) => example.clone(),
                (None, InputKind::Listbox) => Value::Array(Vec::new()),
                (None, _) => continue,
            };
            inputs.record(descriptor, seed)?;
        }
        Ok(inputs)
    }

    /// Record a value for an input.
    ///
    /// A direct write replaces everything collected so far. A keyed write
    /// after a direct write is a [`CollectError::ShapeConflict`].
    pub fn record(&mut self, descriptor: &InputDescriptor, value: Value) -> Result<(), CollectError> {
        debug!(input = %descriptor.id, mapping = ?descriptor.mapping, "recording input value");
        match (descriptor.mapping, &mut *self) {
            (InputMapping::Direct, state) => {
                *state = CollectedInputs::Direct(value);
                Ok(())
            }
            (InputMapping::Keyed, CollectedInputs::Keyed(values)) => {
                values.insert(descriptor.id.clone(), value);
                Ok(())
            }
            (InputMapping::Keyed, CollectedInputs::Direct(_)) => Err(CollectError::ShapeConflict {
                input: descriptor.id.clone(),
            }),
        }
    }

    /// The value currently held for an input, if any.
    pub fn value_for(&self, descriptor: &InputDescriptor) -> Option<&Value> {
        match (self, descriptor.mapping) {
            (CollectedInputs::Direct(value), InputMapping::Direct) => Some(value),
            (CollectedInputs::Keyed(values), InputMapping::Keyed) => values.get(&descriptor.id),
            _ => None,
        }
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        matches!(self, CollectedInputs::Keyed(values) if values.is_empty())
    }
}

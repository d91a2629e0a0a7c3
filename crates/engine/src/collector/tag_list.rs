//! Item-by-item editing for tag-list inputs.

use hudl_types::InputDescriptor;
use serde_json::Value;

use super::{CollectError, CollectedInputs};

/// Draft text plus committed items for one tag-list input.
///
/// Seeded items keep their JSON type; committed drafts are strings. Every
/// edit recomputes the full list and records it for the input.
#[derive(Debug, Clone)]
pub struct TagListEditor {
    descriptor: InputDescriptor,
    items: Vec<Value>,
    draft: String,
}

impl TagListEditor {
    /// Start an editor seeded from the input's example list.
    pub fn new(descriptor: &InputDescriptor) -> Self {
        let items = match &descriptor.example {
            Some(Value::Array(values)) => values.clone(),
            _ => Vec::new(),
        };
        Self {
            descriptor: descriptor.clone(),
            items,
            draft: String::new(),
        }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Append the draft as a new item. No-op when the draft is empty.
    pub fn commit(&mut self, inputs: &mut CollectedInputs) -> Result<bool, CollectError> {
        if self.draft.is_empty() {
            return Ok(false);
        }
        self.items.push(Value::String(std::mem::take(&mut self.draft)));
        self.record(inputs)?;
        Ok(true)
    }

    /// Remove every item equal to `item`.
    pub fn remove(&mut self, item: &Value, inputs: &mut CollectedInputs) -> Result<bool, CollectError> {
        let before = self.items.len();
        self.items.retain(|existing| existing != item);
        self.record(inputs)?;
        Ok(self.items.len() != before)
    }

    /// Deletion on an empty draft pops the last item back into the draft.
    ///
    /// Returns the popped item, or `None` when the draft is non-empty or the
    /// list is empty.
    pub fn delete_on_empty_draft(&mut self, inputs: &mut CollectedInputs) -> Result<Option<Value>, CollectError> {
        if !self.draft.is_empty() {
            return Ok(None);
        }
        let Some(popped) = self.items.pop() else {
            return Ok(None);
        };
        self.draft = item_text(&popped);
        self.record(inputs)?;
        Ok(Some(popped))
    }

    /// The list value recorded for the input.
    pub fn value(&self) -> Value {
        Value::Array(self.items.clone())
    }

    fn record(&self, inputs: &mut CollectedInputs) -> Result<(), CollectError> {
        inputs.record(&self.descriptor, self.value())
    }
}

fn item_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

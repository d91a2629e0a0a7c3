//! Strongly typed blueprint schema shared by the engine, the API client, and the CLI.
//!
//! A blueprint declares everything a widget session needs: the ordered form
//! inputs, the ordered outputs rendered from the service response, and any
//! fixed request fields. Authoring order is preserved (plain `Vec`s and an
//! `IndexMap` for fixed keys) so inputs and outputs render in a predictable
//! sequence.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub mod validation;

/// Static schema describing a session's inputs, outputs, and fixed request fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    /// Optional heading shown above the form.
    #[serde(default)]
    pub title: Option<String>,
    /// Free text describing the model and how to use the form.
    #[serde(default)]
    pub description: String,
    /// Ordered input descriptors.
    #[serde(default)]
    pub inputs: Vec<InputDescriptor>,
    /// Ordered output descriptors.
    #[serde(default)]
    pub outputs: Vec<OutputDescriptor>,
    /// Fixed request fields merged into every keyed payload. These win on key collision.
    #[serde(default)]
    pub input_keys: Option<IndexMap<String, JsonValue>>,
}

impl Blueprint {
    /// Looks up an input descriptor by identifier.
    pub fn input(&self, id: &str) -> Option<&InputDescriptor> {
        self.inputs.iter().find(|input| input.id == id)
    }

    /// Looks up an output descriptor by identifier.
    pub fn output(&self, id: &str) -> Option<&OutputDescriptor> {
        self.outputs.iter().find(|output| output.id == id)
    }

    /// Returns the direct-mapped input, if the blueprint declares one.
    pub fn direct_input(&self) -> Option<&InputDescriptor> {
        self.inputs.iter().find(|input| input.mapping.is_direct())
    }
}

/// A single form input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputDescriptor {
    /// Unique key within the blueprint; the payload key for keyed inputs.
    pub id: String,
    /// Renderer tag for this input.
    pub r#type: InputKind,
    /// Human-readable label.
    #[serde(default)]
    pub label: Option<String>,
    /// Placeholder or helper copy.
    #[serde(default)]
    pub hint: Option<String>,
    /// How the value is aggregated into the payload.
    #[serde(default)]
    pub mapping: InputMapping,
    /// Seed value recorded when a session starts.
    #[serde(default)]
    pub example: Option<JsonValue>,
    /// Visible height hint for multi-line inputs.
    #[serde(default)]
    pub rows: Option<u16>,
}

impl InputDescriptor {
    /// Creates a keyed descriptor with no label, hint, or example.
    pub fn new(id: impl Into<String>, r#type: InputKind) -> Self {
        Self {
            id: id.into(),
            r#type,
            label: None,
            hint: None,
            mapping: InputMapping::Keyed,
            example: None,
            rows: None,
        }
    }

    /// Builder-style setter for the aggregation mode.
    pub fn with_mapping(mut self, mapping: InputMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Builder-style setter for the seed value.
    pub fn with_example(mut self, example: JsonValue) -> Self {
        self.example = Some(example);
        self
    }

    /// Label used when rendering, falling back to the identifier.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Input renderer tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Single-line text.
    Textbox,
    /// Multi-line text.
    Textarea,
    /// Tag list edited item by item.
    Listbox,
    /// Binary file, sent base64-encoded.
    File,
}

impl InputKind {
    /// Every known input tag.
    pub const ALL: [InputKind; 4] = [InputKind::Textbox, InputKind::Textarea, InputKind::Listbox, InputKind::File];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Textbox => "textbox",
            InputKind::Textarea => "textarea",
            InputKind::Listbox => "listbox",
            InputKind::File => "file",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation mode for an input value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputMapping {
    /// The value becomes the entire request payload.
    Direct,
    /// The value is stored under the input id.
    #[default]
    Keyed,
}

impl InputMapping {
    pub fn is_direct(&self) -> bool {
        matches!(self, InputMapping::Direct)
    }
}

/// A single rendered output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDescriptor {
    /// Identifier for reference only.
    pub id: String,
    /// Renderer tag for this output.
    pub r#type: OutputKind,
    /// Heading shown above the rendered value.
    #[serde(default)]
    pub label: Option<String>,
    /// Rule narrowing the raw output before rendering.
    #[serde(default)]
    pub mapping: Option<OutputMapping>,
    /// Per-item numeric transform for chart data.
    #[serde(default)]
    pub transform: Option<NumericTransform>,
    /// Ordered entity labels for entity-highlight outputs.
    #[serde(default)]
    pub entities: Vec<String>,
}

impl OutputDescriptor {
    /// Creates a descriptor that renders the full raw output.
    pub fn new(id: impl Into<String>, r#type: OutputKind) -> Self {
        Self {
            id: id.into(),
            r#type,
            label: None,
            mapping: None,
            transform: None,
            entities: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: OutputMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn with_transform(mut self, transform: NumericTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Label used when rendering.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("Predictions")
    }
}

/// Output renderer tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Plain text; non-string values are shown as JSON.
    Text,
    /// Sequence of `[label, value]` pairs shown as bars.
    Barchart,
    /// Base64-encoded PNG.
    Image,
    /// Sequence of `[token, entity]` pairs with entities highlighted.
    Ner,
}

impl OutputKind {
    /// Every known output tag.
    pub const ALL: [OutputKind; 4] = [OutputKind::Text, OutputKind::Barchart, OutputKind::Image, OutputKind::Ner];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Text => "text",
            OutputKind::Barchart => "barchart",
            OutputKind::Image => "image",
            OutputKind::Ner => "ner",
        }
    }

    /// Whether the kind accepts a numeric transform.
    pub fn is_chart(&self) -> bool {
        matches!(self, OutputKind::Barchart)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule extracting a sub-value from the raw service output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputMapping {
    /// Field lookup on an object output.
    Dict { key: String },
    /// Positional lookup or slice on a sequence output.
    Index { value: IndexSelector },
}

/// Position or `[start, end)` range used by [`OutputMapping::Index`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IndexSelector {
    /// A single element.
    Position(i64),
    /// Contiguous slice bounds; must hold exactly two entries.
    Range(Vec<i64>),
}

/// Named numeric transforms applied to chart values.
///
/// Transforms are selected by tag and never evaluated as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumericTransform {
    /// `x * factor`
    Scale { factor: f64 },
    /// `x * 100`
    Percentage,
    /// `total - x`
    Complement {
        #[serde(default = "default_complement_total")]
        total: f64,
    },
    /// `x + amount`
    Offset { amount: f64 },
    /// Round half away from zero to `decimals` places.
    Round {
        #[serde(default)]
        decimals: u32,
    },
    /// Applies each step in order.
    Chain { steps: Vec<NumericTransform> },
}

fn default_complement_total() -> f64 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_sentiment_blueprint_yaml() {
        let yaml = r#"
description: "LSTM sentiment analyser"
inputs:
  - id: text
    type: textbox
    label: "Text"
    hint: "Enter the text you want to analyse"
    mapping: direct
outputs:
  - id: sentiment
    type: barchart
    label: "Sentiment"
    mapping:
      type: dict
      key: sentiment
    transform:
      type: round
      decimals: 1
"#;
        let blueprint: Blueprint = serde_yaml::from_str(yaml).expect("parse blueprint");
        assert_eq!(blueprint.inputs.len(), 1);
        assert_eq!(blueprint.inputs[0].r#type, InputKind::Textbox);
        assert!(blueprint.inputs[0].mapping.is_direct());
        assert_eq!(
            blueprint.outputs[0].mapping,
            Some(OutputMapping::Dict {
                key: "sentiment".to_string()
            })
        );
        assert_eq!(blueprint.outputs[0].transform, Some(NumericTransform::Round { decimals: 1 }));
        assert!(blueprint.input_keys.is_none());
    }

    #[test]
    fn mapping_defaults_to_keyed() {
        let input: InputDescriptor = serde_json::from_value(json!({ "id": "tags", "type": "listbox" })).unwrap();
        assert_eq!(input.mapping, InputMapping::Keyed);
        assert_eq!(input.display_label(), "tags");
    }

    #[test]
    fn index_selector_accepts_scalar_and_pair() {
        let scalar: OutputMapping = serde_json::from_value(json!({ "type": "index", "value": 3 })).unwrap();
        assert_eq!(
            scalar,
            OutputMapping::Index {
                value: IndexSelector::Position(3)
            }
        );

        let pair: OutputMapping = serde_json::from_value(json!({ "type": "index", "value": [2, 5] })).unwrap();
        assert_eq!(
            pair,
            OutputMapping::Index {
                value: IndexSelector::Range(vec![2, 5])
            }
        );
    }

    #[test]
    fn input_keys_preserve_author_order() {
        let blueprint: Blueprint = serde_json::from_value(json!({
            "description": "",
            "inputKeys": { "zeta": 1, "alpha": 2 }
        }))
        .unwrap();
        let keys: Vec<&String> = blueprint.input_keys.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn expression_transforms_are_rejected() {
        let result = serde_json::from_value::<OutputDescriptor>(json!({
            "id": "chart",
            "type": "barchart",
            "transform": { "type": "math", "expression": "x * 100" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_tags_fail_to_parse() {
        let result = serde_json::from_value::<InputDescriptor>(json!({ "id": "x", "type": "slider" }));
        assert!(result.is_err());
    }
}

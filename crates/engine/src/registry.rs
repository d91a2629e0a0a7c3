//! Renderer registry keyed by input and output tags.
//!
//! Front-ends register one renderer per tag they support. A blueprint is
//! checked against the registry when it is loaded, so an unknown or
//! unsupported tag fails before any session starts instead of rendering
//! nothing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hudl_types::{Blueprint, InputDescriptor, InputKind, OutputDescriptor, OutputKind};
use serde_json::Value;
use thiserror::Error;

use crate::collector::CollectError;

/// Displays and captures values for one input tag.
pub trait InputRenderer: Send + Sync {
    /// Render the input with its current value.
    fn render(&self, descriptor: &InputDescriptor, current: Option<&Value>) -> String;

    /// Turn raw user text into the value recorded for the input.
    fn capture(&self, descriptor: &InputDescriptor, raw: &str) -> Result<Value, CollectError> {
        let _ = descriptor;
        Ok(Value::String(raw.to_string()))
    }
}

/// Displays the mapped value of one output tag.
pub trait OutputRenderer: Send + Sync {
    /// Render an output. `value` is `None` when the mapping selected nothing.
    fn render(&self, descriptor: &OutputDescriptor, value: Option<&Value>) -> String;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("input '{input}' uses tag '{kind}' which has no registered renderer")]
    MissingInputRenderer { input: String, kind: InputKind },

    #[error("output '{output}' uses tag '{kind}' which has no registered renderer")]
    MissingOutputRenderer { output: String, kind: OutputKind },
}

#[derive(Default, Clone)]
pub struct RendererRegistry {
    inputs: HashMap<InputKind, Arc<dyn InputRenderer>>,
    outputs: HashMap<OutputKind, Arc<dyn OutputRenderer>>,
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut inputs: Vec<&str> = self.inputs.keys().map(InputKind::as_str).collect();
        let mut outputs: Vec<&str> = self.outputs.keys().map(OutputKind::as_str).collect();
        inputs.sort_unstable();
        outputs.sort_unstable();
        f.debug_struct("RendererRegistry")
            .field("inputs", &inputs)
            .field("outputs", &outputs)
            .finish()
    }
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the renderer for an input tag.
    pub fn register_input(&mut self, kind: InputKind, renderer: Arc<dyn InputRenderer>) -> &mut Self {
        self.inputs.insert(kind, renderer);
        self
    }

    /// Register (or replace) the renderer for an output tag.
    pub fn register_output(&mut self, kind: OutputKind, renderer: Arc<dyn OutputRenderer>) -> &mut Self {
        self.outputs.insert(kind, renderer);
        self
    }

    pub fn input_renderer(&self, kind: InputKind) -> Option<Arc<dyn InputRenderer>> {
        self.inputs.get(&kind).cloned()
    }

    pub fn output_renderer(&self, kind: OutputKind) -> Option<Arc<dyn OutputRenderer>> {
        self.outputs.get(&kind).cloned()
    }

    /// Confirm every tag in the blueprint has a renderer.
    pub fn validate(&self, blueprint: &Blueprint) -> Result<(), RegistryError> {
        for input in &blueprint.inputs {
            if !self.inputs.contains_key(&input.r#type) {
                return Err(RegistryError::MissingInputRenderer {
                    input: input.id.clone(),
                    kind: input.r#type,
                });
            }
        }
        for output in &blueprint.outputs {
            if !self.outputs.contains_key(&output.r#type) {
                return Err(RegistryError::MissingOutputRenderer {
                    output: output.id.clone(),
                    kind: output.r#type,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl InputRenderer for Plain {
        fn render(&self, descriptor: &InputDescriptor, current: Option<&Value>) -> String {
            format!("{}: {}", descriptor.display_label(), current.map(Value::to_string).unwrap_or_default())
        }
    }

    impl OutputRenderer for Plain {
        fn render(&self, descriptor: &OutputDescriptor, value: Option<&Value>) -> String {
            format!("{} => {:?}", descriptor.display_label(), value)
        }
    }

    fn blueprint() -> Blueprint {
        Blueprint {
            inputs: vec![InputDescriptor::new("text", InputKind::Textbox)],
            outputs: vec![OutputDescriptor::new("chart", OutputKind::Barchart)],
            ..Blueprint::default()
        }
    }

    #[test]
    fn validate_reports_first_missing_renderer() {
        let mut registry = RendererRegistry::new();
        assert_eq!(
            registry.validate(&blueprint()),
            Err(RegistryError::MissingInputRenderer {
                input: "text".into(),
                kind: InputKind::Textbox
            })
        );

        registry.register_input(InputKind::Textbox, Arc::new(Plain));
        assert_eq!(
            registry.validate(&blueprint()),
            Err(RegistryError::MissingOutputRenderer {
                output: "chart".into(),
                kind: OutputKind::Barchart
            })
        );

        registry.register_output(OutputKind::Barchart, Arc::new(Plain));
        assert!(registry.validate(&blueprint()).is_ok());
    }

    #[test]
    fn default_capture_records_raw_text() {
        let descriptor = InputDescriptor::new("text", InputKind::Textbox);
        assert_eq!(Plain.capture(&descriptor, "great day").unwrap(), Value::String("great day".into()));
    }

    #[test]
    fn renderers_are_looked_up_by_tag() {
        let mut registry = RendererRegistry::new();
        registry.register_output(OutputKind::Text, Arc::new(Plain));
        let renderer = registry.output_renderer(OutputKind::Text).unwrap();
        let descriptor = OutputDescriptor::new("out", OutputKind::Text);
        assert_eq!(renderer.render(&descriptor, None), "Predictions => None");
        assert!(registry.output_renderer(OutputKind::Image).is_none());
        assert_eq!(format!("{registry:?}"), r#"RendererRegistry { inputs: [], outputs: ["text"] }"#);
    }
}

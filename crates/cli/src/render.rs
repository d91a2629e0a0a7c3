//! Plain-terminal renderers for every input and output tag.

use std::sync::Arc;

use hudl_engine::{CollectError, InputRenderer, OutputRenderer, RendererRegistry, encode_file_input};
use hudl_types::{InputDescriptor, InputKind, OutputDescriptor, OutputKind};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

const WRAP_WIDTH: usize = 72;
const BAR_WIDTH: usize = 30;
const PLACEHOLDER: &str = "(no data)";
const DEFAULT_TEXTAREA_ROWS: u16 = 7;
const ENTITY_MARKERS: [&str; 6] = ["●", "■", "▲", "◆", "★", "✚"];

/// Registry with a renderer for every known tag.
pub fn terminal_registry() -> RendererRegistry {
    let mut registry = RendererRegistry::new();
    registry
        .register_input(InputKind::Textbox, Arc::new(TextInput { multiline: false }))
        .register_input(InputKind::Textarea, Arc::new(TextInput { multiline: true }))
        .register_input(InputKind::Listbox, Arc::new(TagListInput))
        .register_input(InputKind::File, Arc::new(FileInput))
        .register_output(OutputKind::Text, Arc::new(TextOutput))
        .register_output(OutputKind::Barchart, Arc::new(BarChartOutput))
        .register_output(OutputKind::Image, Arc::new(ImageOutput))
        .register_output(OutputKind::Ner, Arc::new(EntityOutput));
    registry
}

/// Wrap free text to the terminal width.
pub fn wrap(text: &str) -> String {
    textwrap::fill(text, WRAP_WIDTH)
}

fn header(label: &str, hint: Option<&str>) -> String {
    match hint {
        Some(hint) if !hint.is_empty() => format!("{label}\n  {hint}"),
        _ => label.to_string(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

struct TextInput {
    multiline: bool,
}

impl InputRenderer for TextInput {
    fn render(&self, descriptor: &InputDescriptor, current: Option<&Value>) -> String {
        let head = header(descriptor.display_label(), descriptor.hint.as_deref());
        let value = current.map(display_value).unwrap_or_default();
        if !self.multiline {
            return format!("{head}\n  > {value}");
        }
        let rows = usize::from(descriptor.rows.unwrap_or(DEFAULT_TEXTAREA_ROWS)).max(1);
        let mut lines: Vec<String> = textwrap::wrap(&value, WRAP_WIDTH - 4).into_iter().map(|line| line.into_owned()).collect();
        while lines.len() < rows {
            lines.push(String::new());
        }
        let body: Vec<String> = lines.iter().map(|line| format!("  | {line}")).collect();
        format!("{head}\n{}", body.join("\n"))
    }
}

struct TagListInput;

impl InputRenderer for TagListInput {
    fn render(&self, descriptor: &InputDescriptor, current: Option<&Value>) -> String {
        let head = header(descriptor.display_label(), descriptor.hint.as_deref());
        let items = match current {
            Some(Value::Array(items)) if !items.is_empty() => {
                items.iter().map(|item| format!("[{}]", display_value(item))).collect::<Vec<_>>().join(" ")
            }
            _ => "(empty)".to_string(),
        };
        format!("{head}\n  {items}")
    }

    /// Comma-separated items; blanks are skipped.
    fn capture(&self, _descriptor: &InputDescriptor, raw: &str) -> Result<Value, CollectError> {
        Ok(Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ))
    }
}

struct FileInput;

impl InputRenderer for FileInput {
    fn render(&self, descriptor: &InputDescriptor, current: Option<&Value>) -> String {
        let head = header(descriptor.display_label(), descriptor.hint.as_deref());
        match current {
            Some(Value::String(encoded)) => format!("{head}\n  <file: {} base64 chars>", encoded.len()),
            _ => format!("{head}\n  <no file selected>"),
        }
    }

    /// `raw` is a path; the file is read and base64-encoded.
    fn capture(&self, descriptor: &InputDescriptor, raw: &str) -> Result<Value, CollectError> {
        encode_file_input(descriptor, &[raw])?.ok_or_else(|| CollectError::invalid_value(&descriptor.id, "a file path"))
    }
}

struct TextOutput;

impl OutputRenderer for TextOutput {
    fn render(&self, descriptor: &OutputDescriptor, value: Option<&Value>) -> String {
        let body = match value {
            Some(Value::String(text)) => wrap(text),
            Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
            None => PLACEHOLDER.to_string(),
        };
        format!("{}\n{body}", descriptor.display_label())
    }
}

struct BarChartOutput;

impl BarChartOutput {
    fn pairs(value: &Value) -> Vec<(String, Option<f64>)> {
        let Value::Array(items) = value else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::Array(pair) if pair.len() == 2 => Some((display_value(&pair[0]), pair[1].as_f64())),
                _ => None,
            })
            .collect()
    }
}

impl OutputRenderer for BarChartOutput {
    /// Values are percentages: each bar is its share of 100.
    fn render(&self, descriptor: &OutputDescriptor, value: Option<&Value>) -> String {
        let title = descriptor.display_label();
        let pairs = value.map(Self::pairs).unwrap_or_default();
        if pairs.is_empty() {
            return format!("{title}\n{PLACEHOLDER}");
        }

        let heads: Vec<String> = pairs
            .iter()
            .map(|(label, amount)| match amount {
                Some(amount) => format!("{label}: {amount:.2}%"),
                None => format!("{label}: -"),
            })
            .collect();
        let head_width = heads.iter().map(|head| head.width()).max().unwrap_or(0);

        let mut lines = vec![title.to_string()];
        for (head, (_, amount)) in heads.iter().zip(&pairs) {
            let padding = " ".repeat(head_width - head.width());
            let share = amount.unwrap_or(0.0).clamp(0.0, 100.0);
            let filled = ((share / 100.0) * BAR_WIDTH as f64).round() as usize;
            lines.push(format!(
                "{head}{padding} {}{}",
                "█".repeat(filled),
                "░".repeat(BAR_WIDTH - filled)
            ));
        }
        lines.join("\n")
    }
}

struct ImageOutput;

impl OutputRenderer for ImageOutput {
    fn render(&self, descriptor: &OutputDescriptor, value: Option<&Value>) -> String {
        let body = match value {
            Some(Value::String(encoded)) => format!("<png image: {} base64 chars>", encoded.len()),
            _ => PLACEHOLDER.to_string(),
        };
        format!("{}\n{body}", descriptor.display_label())
    }
}

struct EntityOutput;

impl EntityOutput {
    /// Marker for an entity, by its position in the descriptor's `entities`.
    fn marker(descriptor: &OutputDescriptor, entity: &str) -> Option<&'static str> {
        descriptor
            .entities
            .iter()
            .position(|known| known == entity)
            .map(|index| ENTITY_MARKERS[index % ENTITY_MARKERS.len()])
    }
}

impl OutputRenderer for EntityOutput {
    fn render(&self, descriptor: &OutputDescriptor, value: Option<&Value>) -> String {
        let title = descriptor.display_label();
        let Some(Value::Array(tokens)) = value else {
            return format!("{title}\n{PLACEHOLDER}");
        };

        let rendered: Vec<String> = tokens
            .iter()
            .map(|token| match token {
                Value::Array(pair) if pair.len() == 2 => {
                    let text = display_value(&pair[0]);
                    match pair[1].as_str() {
                        Some("O") | None => text,
                        Some(entity) => match Self::marker(descriptor, entity) {
                            Some(marker) => format!("[{marker} {text} {entity}]"),
                            None => format!("[{text} {entity}]"),
                        },
                    }
                }
                other => display_value(other),
            })
            .collect();

        let mut out = format!("{title}\n{}", wrap(&rendered.join(" ")));
        if !descriptor.entities.is_empty() {
            let legend: Vec<String> = descriptor
                .entities
                .iter()
                .filter_map(|entity| Self::marker(descriptor, entity).map(|marker| format!("{marker} {entity}")))
                .collect();
            out.push_str(&format!("\n{}", legend.join("  ")));
        }
        out
    }
}

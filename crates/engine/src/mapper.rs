//! Narrowing raw service output down to what each output renders.

use hudl_types::{IndexSelector, OutputDescriptor, OutputMapping};
use serde_json::Value;

use crate::transform::apply_chart_transform;

/// Select the portion of `raw` an output renders.
///
/// - no mapping: the whole raw output
/// - `dict`: the field named `key`
/// - `index` with a position: the element at that position
/// - `index` with `[start, end]`: the half-open slice, negative bounds
///   counting from the end
///
/// Missing fields, out-of-range positions, and malformed ranges yield `None`.
pub fn map_output(descriptor: &OutputDescriptor, raw: &Value) -> Option<Value> {
    match &descriptor.mapping {
        None => Some(raw.clone()),
        Some(OutputMapping::Dict { key }) => raw.get(key).cloned(),
        Some(OutputMapping::Index { value: IndexSelector::Position(position) }) => select_position(raw, *position),
        Some(OutputMapping::Index { value: IndexSelector::Range(bounds) }) => match bounds.as_slice() {
            [start, end] => select_range(raw, *start, *end),
            _ => None,
        },
    }
}

/// Map an output and apply its chart transform, if any.
pub fn project_output(descriptor: &OutputDescriptor, raw: &Value) -> Option<Value> {
    let mapped = map_output(descriptor, raw)?;
    match &descriptor.transform {
        Some(transform) if descriptor.r#type.is_chart() => Some(apply_chart_transform(transform, &mapped)),
        _ => Some(mapped),
    }
}

fn select_position(raw: &Value, position: i64) -> Option<Value> {
    let index = usize::try_from(position).ok()?;
    match raw {
        Value::Array(items) => items.get(index).cloned(),
        Value::Object(fields) => fields.get(&index.to_string()).cloned(),
        Value::String(text) => text.chars().nth(index).map(|c| Value::String(c.to_string())),
        _ => None,
    }
}

fn select_range(raw: &Value, start: i64, end: i64) -> Option<Value> {
    match raw {
        Value::Array(items) => {
            let (from, to) = slice_bounds(items.len(), start, end);
            Some(Value::Array(items[from..to].to_vec()))
        }
        Value::String(text) => {
            let chars: Vec<char> = text.chars().collect();
            let (from, to) = slice_bounds(chars.len(), start, end);
            Some(Value::String(chars[from..to].iter().collect()))
        }
        _ => None,
    }
}

/// Resolve possibly-negative bounds against `len`, clamped so `from <= to <= len`.
fn slice_bounds(len: usize, start: i64, end: i64) -> (usize, usize) {
    let resolve = |bound: i64| -> usize {
        if bound < 0 {
            len.saturating_sub(bound.unsigned_abs() as usize)
        } else {
            (bound as usize).min(len)
        }
    };
    let from = resolve(start);
    let to = resolve(end).max(from);
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudl_types::{NumericTransform, OutputKind};
    use serde_json::json;

    fn text_output(mapping: Option<OutputMapping>) -> OutputDescriptor {
        OutputDescriptor {
            mapping,
            ..OutputDescriptor::new("out", OutputKind::Text)
        }
    }

    fn index(selector: IndexSelector) -> Option<OutputMapping> {
        Some(OutputMapping::Index { value: selector })
    }

    #[test]
    fn no_mapping_returns_whole_output() {
        let raw = json!({ "a": 1 });
        assert_eq!(map_output(&text_output(None), &raw), Some(raw));
    }

    #[test]
    fn dict_mapping_selects_field_or_nothing() {
        let raw = json!({ "sentiment": [["positive", 0.9]] });
        let present = text_output(Some(OutputMapping::Dict { key: "sentiment".into() }));
        let missing = text_output(Some(OutputMapping::Dict { key: "absent".into() }));
        assert_eq!(map_output(&present, &raw), Some(json!([["positive", 0.9]])));
        assert_eq!(map_output(&missing, &raw), None);
        assert_eq!(map_output(&present, &json!("not an object")), None);
    }

    #[test]
    fn index_range_is_half_open() {
        let raw = json!([0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let descriptor = text_output(index(IndexSelector::Range(vec![2, 5])));
        assert_eq!(map_output(&descriptor, &raw), Some(json!([2, 3, 4])));
    }

    #[test]
    fn index_range_handles_negative_and_out_of_bounds() {
        let raw = json!(["a", "b", "c", "d"]);
        let tail = text_output(index(IndexSelector::Range(vec![-2, 10])));
        assert_eq!(map_output(&tail, &raw), Some(json!(["c", "d"])));

        let inverted = text_output(index(IndexSelector::Range(vec![3, 1])));
        assert_eq!(map_output(&inverted, &raw), Some(json!([])));

        let string_slice = text_output(index(IndexSelector::Range(vec![0, 5])));
        assert_eq!(map_output(&string_slice, &json!("hello world")), Some(json!("hello")));
    }

    #[test]
    fn malformed_range_yields_nothing() {
        let raw = json!([1, 2, 3]);
        assert_eq!(map_output(&text_output(index(IndexSelector::Range(vec![1]))), &raw), None);
        assert_eq!(map_output(&text_output(index(IndexSelector::Range(vec![0, 1, 2]))), &raw), None);
    }

    #[test]
    fn index_position_selects_element() {
        let raw = json!(["first", "second"]);
        assert_eq!(map_output(&text_output(index(IndexSelector::Position(1))), &raw), Some(json!("second")));
        assert_eq!(map_output(&text_output(index(IndexSelector::Position(5))), &raw), None);
        assert_eq!(map_output(&text_output(index(IndexSelector::Position(-1))), &raw), None);
    }

    #[test]
    fn projection_applies_transform_to_charts_only() {
        let raw = json!({ "scores": [["positive", 0.5]] });
        let mapping = Some(OutputMapping::Dict { key: "scores".into() });

        let chart = OutputDescriptor {
            mapping: mapping.clone(),
            ..OutputDescriptor::new("chart", OutputKind::Barchart)
        }
        .with_transform(NumericTransform::Percentage);
        assert_eq!(project_output(&chart, &raw), Some(json!([["positive", 50.0]])));

        let text = OutputDescriptor {
            mapping,
            ..OutputDescriptor::new("text", OutputKind::Text)
        }
        .with_transform(NumericTransform::Percentage);
        assert_eq!(project_output(&text, &raw), Some(json!([["positive", 0.5]])));
    }
}

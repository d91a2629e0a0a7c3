//! Request payload assembly.

use hudl_types::Blueprint;
use serde_json::{Map, Value};

use crate::collector::CollectedInputs;

/// Build the request body from collected values and the blueprint's fixed keys.
///
/// Keyed state is merged with `inputKeys`, fixed keys winning on collision. A
/// direct value is sent as-is unless it is an object, which is merged the same
/// way. Pure: repeated calls on the same state produce equal payloads.
pub fn build_payload(blueprint: &Blueprint, inputs: &CollectedInputs) -> Value {
    match inputs {
        CollectedInputs::Keyed(values) => Value::Object(merge_fixed_keys(blueprint, values)),
        CollectedInputs::Direct(Value::Object(values)) => Value::Object(merge_fixed_keys(blueprint, values)),
        CollectedInputs::Direct(value) => value.clone(),
    }
}

fn merge_fixed_keys(blueprint: &Blueprint, values: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = values.clone();
    if let Some(fixed) = &blueprint.input_keys {
        for (key, value) in fixed {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn blueprint_with_keys(keys: &[(&str, Value)]) -> Blueprint {
        let input_keys: IndexMap<String, Value> = keys.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Blueprint {
            input_keys: Some(input_keys),
            ..Blueprint::default()
        }
    }

    fn keyed(value: Value) -> CollectedInputs {
        CollectedInputs::Keyed(value.as_object().cloned().unwrap())
    }

    #[test]
    fn fixed_keys_win_on_collision() {
        let blueprint = blueprint_with_keys(&[("model", json!("lstm")), ("top_k", json!(3))]);
        let payload = build_payload(&blueprint, &keyed(json!({ "question": "why?", "model": "user" })));
        assert_eq!(payload, json!({ "question": "why?", "model": "lstm", "top_k": 3 }));
    }

    #[test]
    fn empty_state_without_keys_is_empty_object() {
        assert_eq!(build_payload(&Blueprint::default(), &CollectedInputs::new()), json!({}));
    }

    #[test]
    fn direct_scalar_is_sent_unchanged() {
        let blueprint = blueprint_with_keys(&[("ignored", json!(true))]);
        let payload = build_payload(&blueprint, &CollectedInputs::Direct(json!("great day")));
        assert_eq!(payload, json!("great day"));

        let list = build_payload(&blueprint, &CollectedInputs::Direct(json!(["a", "b"])));
        assert_eq!(list, json!(["a", "b"]));
    }

    #[test]
    fn direct_object_is_merged_with_fixed_keys() {
        let blueprint = blueprint_with_keys(&[("mode", json!("fast"))]);
        let payload = build_payload(&blueprint, &CollectedInputs::Direct(json!({ "text": "hi", "mode": "slow" })));
        assert_eq!(payload, json!({ "text": "hi", "mode": "fast" }));
    }

    #[test]
    fn building_twice_is_stable_and_does_not_mutate_state() {
        let blueprint = blueprint_with_keys(&[("k", json!(1))]);
        let inputs = keyed(json!({ "a": "x" }));
        let first = build_payload(&blueprint, &inputs);
        let second = build_payload(&blueprint, &inputs);
        assert_eq!(first, second);
        assert_eq!(inputs, keyed(json!({ "a": "x" })));
    }
}

//! Named numeric transforms for chart data.

use hudl_types::NumericTransform;
use serde_json::{Number, Value};

const MAX_ROUND_DECIMALS: u32 = 12;

/// Apply a transform to a single number.
pub fn apply_numeric(transform: &NumericTransform, x: f64) -> f64 {
    match transform {
        NumericTransform::Scale { factor } => x * factor,
        NumericTransform::Percentage => x * 100.0,
        NumericTransform::Complement { total } => total - x,
        NumericTransform::Offset { amount } => x + amount,
        NumericTransform::Round { decimals } => {
            let scale = 10f64.powi((*decimals).min(MAX_ROUND_DECIMALS) as i32);
            (x * scale).round() / scale
        }
        NumericTransform::Chain { steps } => steps.iter().fold(x, |acc, step| apply_numeric(step, acc)),
    }
}

/// Rewrite the numeric half of every `[label, number]` pair in chart data.
///
/// Items that are not such pairs pass through untouched, as does any value
/// that is not a sequence. Non-finite results become `null`.
pub fn apply_chart_transform(transform: &NumericTransform, data: &Value) -> Value {
    let Value::Array(items) = data else {
        return data.clone();
    };
    Value::Array(items.iter().map(|item| transform_pair(transform, item)).collect())
}

fn transform_pair(transform: &NumericTransform, item: &Value) -> Value {
    match item {
        Value::Array(pair) if pair.len() == 2 => match pair[1].as_f64() {
            Some(x) => {
                let transformed = Number::from_f64(apply_numeric(transform, x)).map_or(Value::Null, Value::Number);
                Value::Array(vec![pair[0].clone(), transformed])
            }
            None => item.clone(),
        },
        _ => item.clone(),
    }
}

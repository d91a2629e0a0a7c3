//! Load-time validation for blueprints.
//!
//! Blueprints are static documents, so every structural problem is reported
//! before a session starts instead of surfacing as an empty render later.

use std::collections::HashSet;

use thiserror::Error;

use super::{Blueprint, IndexSelector, OutputMapping};

/// Structural problems detected in a blueprint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlueprintError {
    #[error("input #{index} has an empty id")]
    EmptyInputId { index: usize },

    #[error("input id '{id}' is declared more than once")]
    DuplicateInputId { id: String },

    #[error("only one input may use direct mapping; found {}", .ids.join(", "))]
    MultipleDirectInputs { ids: Vec<String> },

    #[error("direct input '{direct}' replaces the whole payload and cannot be combined with keyed inputs ({})", .keyed.join(", "))]
    MixedDirectAndKeyed { direct: String, keyed: Vec<String> },

    #[error("output '{output}' of type '{kind}' does not accept a transform")]
    TransformOnNonChart { output: String, kind: String },

    #[error("output '{output}' index range must have exactly two bounds; found {len}")]
    MalformedIndexRange { output: String, len: usize },

    #[error("output '{output}' dict mapping has an empty key")]
    EmptyDictKey { output: String },
}

/// Validate a blueprint, returning the first problem found.
///
/// Checks, in order:
/// - input ids are non-empty and unique;
/// - at most one input is direct-mapped, and a direct input is the only input;
/// - transforms only appear on chart outputs;
/// - `index` ranges have exactly two bounds and `dict` keys are non-empty.
pub fn validate_blueprint(blueprint: &Blueprint) -> Result<(), BlueprintError> {
    let mut seen = HashSet::new();
    for (index, input) in blueprint.inputs.iter().enumerate() {
        if input.id.trim().is_empty() {
            return Err(BlueprintError::EmptyInputId { index });
        }
        if !seen.insert(input.id.as_str()) {
            return Err(BlueprintError::DuplicateInputId { id: input.id.clone() });
        }
    }

    let (direct, keyed): (Vec<_>, Vec<_>) = blueprint.inputs.iter().partition(|input| input.mapping.is_direct());
    if direct.len() > 1 {
        return Err(BlueprintError::MultipleDirectInputs {
            ids: direct.iter().map(|input| input.id.clone()).collect(),
        });
    }
    if let Some(direct_input) = direct.first()
        && !keyed.is_empty()
    {
        return Err(BlueprintError::MixedDirectAndKeyed {
            direct: direct_input.id.clone(),
            keyed: keyed.iter().map(|input| input.id.clone()).collect(),
        });
    }

    for output in &blueprint.outputs {
        if output.transform.is_some() && !output.r#type.is_chart() {
            return Err(BlueprintError::TransformOnNonChart {
                output: output.id.clone(),
                kind: output.r#type.to_string(),
            });
        }
        match &output.mapping {
            Some(OutputMapping::Index {
                value: IndexSelector::Range(bounds),
            }) if bounds.len() != 2 => {
                return Err(BlueprintError::MalformedIndexRange {
                    output: output.id.clone(),
                    len: bounds.len(),
                });
            }
            Some(OutputMapping::Dict { key }) if key.is_empty() => {
                return Err(BlueprintError::EmptyDictKey { output: output.id.clone() });
            }
            _ => {}
        }
    }

    Ok(())
}

//! # HUDL Engine
//!
//! The HUDL engine turns a declarative blueprint into a working inference
//! widget session: it loads and validates blueprints, collects input values,
//! assembles request payloads, drives the remote round-trips, and narrows the
//! response down to what each output renders.
//!
//! ## Usage
//!
//! ```rust
//! use hudl_engine::load_blueprint_file;
//!
//! let temp_dir = tempfile::tempdir()?;
//! let blueprint_path = temp_dir.path().join("sentiment.yaml");
//! std::fs::write(&blueprint_path, r#"
//! description: "Sentiment analysis"
//! inputs:
//!   - id: text
//!     type: textbox
//!     mapping: direct
//! outputs:
//!   - id: sentiment
//!     type: barchart
//! "#)?;
//!
//! let blueprint = load_blueprint_file(&blueprint_path)?;
//! assert_eq!(blueprint.inputs.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`collector`**: collected input state, tag-list editing, file encoding
//! - **`payload`**: request body assembly with fixed keys
//! - **`session`**: probe/invoke lifecycle, status, request sequencing
//! - **`mapper`**: output mappings and chart transforms
//! - **`registry`**: renderer registry keyed by type tag

use std::{fs, path::Path};

use anyhow::{Context, Result};
use hudl_types::{Blueprint, validate_blueprint};
use tracing::debug;

pub mod collector;
pub mod mapper;
pub mod payload;
pub mod registry;
pub mod session;
pub mod transform;

pub use collector::{CollectError, CollectedInputs, TagListEditor, encode_bytes, encode_file_input};
pub use mapper::{map_output, project_output};
pub use payload::build_payload;
pub use registry::{InputRenderer, OutputRenderer, RegistryError, RendererRegistry};
pub use session::{
    FAILURE_NOTICE, InvokeOutcome, OutputView, PendingInvocation, Session, SessionEvent, SessionStatus, SessionTelemetry,
};
pub use transform::{apply_chart_transform, apply_numeric};

/// Serialization format of a blueprint document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlueprintFormat {
    Yaml,
    Json,
}

impl BlueprintFormat {
    /// Detect the format from a file extension. Anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => BlueprintFormat::Json,
            _ => BlueprintFormat::Yaml,
        }
    }
}

/// Parse a blueprint document without validating it.
pub fn parse_blueprint_str(content: &str, format: BlueprintFormat) -> Result<Blueprint> {
    match format {
        BlueprintFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse blueprint YAML"),
        BlueprintFormat::Json => serde_json::from_str(content).context("Failed to parse blueprint JSON"),
    }
}

/// Reads a blueprint file with format detection by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match the
/// blueprint schema (including unknown type tags).
pub fn parse_blueprint_file(file_path: impl AsRef<Path>) -> Result<Blueprint> {
    let file_path = file_path.as_ref();
    let content =
        fs::read_to_string(file_path).with_context(|| format!("Failed to read blueprint file: {}", file_path.display()))?;
    parse_blueprint_str(&content, BlueprintFormat::from_path(file_path))
        .with_context(|| format!("Invalid blueprint: {}", file_path.display()))
}

/// Parse and validate a blueprint document.
pub fn load_blueprint_str(content: &str, format: BlueprintFormat) -> Result<Blueprint> {
    let blueprint = parse_blueprint_str(content, format)?;
    validate_blueprint(&blueprint).context("Blueprint failed validation")?;
    debug!(inputs = blueprint.inputs.len(), outputs = blueprint.outputs.len(), "blueprint loaded");
    Ok(blueprint)
}

/// Read, parse, and validate a blueprint file.
pub fn load_blueprint_file(file_path: impl AsRef<Path>) -> Result<Blueprint> {
    let file_path = file_path.as_ref();
    let blueprint = parse_blueprint_file(file_path)?;
    validate_blueprint(&blueprint).with_context(|| format!("Blueprint failed validation: {}", file_path.display()))?;
    debug!(path = %file_path.display(), inputs = blueprint.inputs.len(), outputs = blueprint.outputs.len(), "blueprint loaded");
    Ok(blueprint)
}

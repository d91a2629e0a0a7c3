//! Shared type definitions for HUDL widgets.
//!
//! The blueprint schema lives here so the engine, the API client, and the CLI
//! agree on one authoring format.

pub mod blueprint;

pub use blueprint::validation::{BlueprintError, validate_blueprint};
pub use blueprint::{
    Blueprint, IndexSelector, InputDescriptor, InputKind, InputMapping, NumericTransform, OutputDescriptor, OutputKind, OutputMapping,
};

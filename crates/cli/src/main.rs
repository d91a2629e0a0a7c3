use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use hudl_api::{EndpointConfig, InferenceClient};
use hudl_engine::{
    BlueprintFormat, InvokeOutcome, RendererRegistry, Session, SessionEvent, TagListEditor, encode_file_input, load_blueprint_file,
    load_blueprint_str,
};
use hudl_types::{Blueprint, InputDescriptor, InputKind};
use tracing::debug;

mod render;

const DEFAULT_BLUEPRINT: &str = include_str!("../blueprints/sentiment.yaml");

#[derive(Debug, Parser)]
#[command(name = "hudl", version, about = "Run a blueprint-driven inference widget from the terminal")]
struct Cli {
    /// Blueprint file (YAML, or JSON by extension). Defaults to the built-in sentiment widget.
    #[arg(long, global = true)]
    blueprint: Option<PathBuf>,

    /// Inference endpoint; overrides HUDL_ENDPOINT.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Credential sent as x-api-key; overrides HUDL_API_KEY.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the blueprint's description, inputs with their seeded values, and outputs.
    Describe,
    /// Load the blueprint and check it against the renderer registry.
    Validate,
    /// Collect inputs, call the endpoint, and render the outputs.
    Predict(PredictArgs),
}

#[derive(Debug, Args)]
struct PredictArgs {
    /// Set an input value: `id=value`.
    #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Append one item to a tag-list input: `id=item`.
    #[arg(long = "item", value_name = "ID=ITEM", value_parser = parse_assignment)]
    item: Vec<(String, String)>,

    /// Attach a file to a file input: `id=path`.
    #[arg(long = "file", value_name = "ID=PATH", value_parser = parse_assignment)]
    file: Vec<(String, String)>,

    /// Print the request instead of sending it.
    #[arg(long)]
    dry_run: bool,

    /// Skip the readiness probe.
    #[arg(long)]
    skip_probe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let registry = render::terminal_registry();
    let blueprint = load_blueprint(cli.blueprint.as_ref(), &registry)?;

    match cli.command {
        Command::Describe => describe(&blueprint, &registry),
        Command::Validate => {
            println!(
                "Blueprint OK: {} input(s), {} output(s)",
                blueprint.inputs.len(),
                blueprint.outputs.len()
            );
            Ok(())
        }
        Command::Predict(args) => predict(blueprint, &registry, cli.endpoint, cli.api_key, args).await,
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (id, value) = raw.split_once('=').ok_or_else(|| format!("expected ID=VALUE, got '{raw}'"))?;
    if id.trim().is_empty() {
        return Err(format!("missing input id in '{raw}'"));
    }
    Ok((id.trim().to_string(), value.to_string()))
}

fn load_blueprint(path: Option<&PathBuf>, registry: &RendererRegistry) -> Result<Blueprint> {
    let blueprint = match path {
        Some(path) => load_blueprint_file(path)?,
        None => load_blueprint_str(DEFAULT_BLUEPRINT, BlueprintFormat::Yaml).context("built-in blueprint is invalid")?,
    };
    registry.validate(&blueprint)?;
    Ok(blueprint)
}

fn describe(blueprint: &Blueprint, registry: &RendererRegistry) -> Result<()> {
    let session = Session::new(Arc::new(blueprint.clone()))?;

    if let Some(title) = &blueprint.title {
        println!("{title}\n");
    }
    println!("{}\n", render::wrap(&blueprint.description));

    for input in &blueprint.inputs {
        let renderer = registry
            .input_renderer(input.r#type)
            .ok_or_else(|| anyhow!("no renderer for input type '{}'", input.r#type))?;
        println!("{}\n", renderer.render(input, session.inputs().value_for(input)));
    }

    println!("Outputs:");
    for output in &blueprint.outputs {
        let mapping = match &output.mapping {
            Some(mapping) => serde_json::to_string(mapping)?,
            None => "whole output".to_string(),
        };
        println!("  {} ({}) <- {}", output.display_label(), output.r#type, mapping);
    }
    Ok(())
}

async fn predict(
    blueprint: Blueprint,
    registry: &RendererRegistry,
    endpoint: Option<String>,
    api_key: Option<String>,
    args: PredictArgs,
) -> Result<()> {
    let blueprint = Arc::new(blueprint);
    let mut session = Session::new(blueprint.clone())?;

    for (id, raw) in &args.set {
        let input = find_input(&blueprint, id)?;
        let renderer = registry
            .input_renderer(input.r#type)
            .ok_or_else(|| anyhow!("no renderer for input type '{}'", input.r#type))?;
        let value = renderer.capture(input, raw)?;
        session.record(id, value)?;
    }

    let mut editors: HashMap<&str, TagListEditor> = HashMap::new();
    for (id, item) in &args.item {
        let input = find_input(&blueprint, id)?;
        if input.r#type != InputKind::Listbox {
            bail!("input '{id}' is not a tag list");
        }
        // Start from whatever --set or seeding already recorded for the list.
        let editor = editors
            .entry(input.id.as_str())
            .or_insert_with(|| match session.inputs().value_for(input) {
                Some(current) => TagListEditor::new(&input.clone().with_example(current.clone())),
                None => TagListEditor::new(input),
            });
        editor.set_draft(item.as_str());
        editor.commit(session.inputs_mut())?;
    }

    for (id, path) in &args.file {
        let input = find_input(&blueprint, id)?;
        if input.r#type != InputKind::File {
            bail!("input '{id}' is not a file input");
        }
        if let Some(encoded) = encode_file_input(input, &[path])? {
            session.record(id, encoded)?;
        }
    }

    let config = EndpointConfig::from_env_with_overrides(endpoint, api_key)?;
    let client = InferenceClient::new(&config)?;

    if args.dry_run {
        let preview = client.preview_predict(&session.payload())?;
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    if !args.skip_probe {
        session.probe(&client).await;
        report_events(&mut session);
    }

    let outcome = session.invoke(&client).await;
    report_events(&mut session);
    debug!(?outcome, "prediction finished");

    if let InvokeOutcome::Failed { notice, .. } = outcome {
        bail!(notice);
    }

    if let Some(views) = session.rendered_outputs() {
        for view in views {
            let renderer = registry
                .output_renderer(view.descriptor.r#type)
                .ok_or_else(|| anyhow!("no renderer for output type '{}'", view.descriptor.r#type))?;
            println!("{}\n", renderer.render(view.descriptor, view.value.as_ref()));
        }
    }
    Ok(())
}

fn find_input<'a>(blueprint: &'a Blueprint, id: &str) -> Result<&'a InputDescriptor> {
    blueprint
        .input(id)
        .ok_or_else(|| anyhow!("unknown input '{id}'; known inputs: {}", known_inputs(blueprint)))
}

fn known_inputs(blueprint: &Blueprint) -> String {
    blueprint
        .inputs
        .iter()
        .map(|input| input.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print status changes to stderr as they happened.
fn report_events(session: &mut Session) {
    for event in session.telemetry_mut().drain() {
        if let SessionEvent::StatusChanged { to, .. } = event {
            eprintln!("{to}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_blueprint_loads_and_matches_registry() {
        let registry = render::terminal_registry();
        let blueprint = load_blueprint(None, &registry).expect("built-in blueprint");
        assert_eq!(blueprint.inputs[0].id, "text");
        assert!(blueprint.inputs[0].mapping.is_direct());
        assert_eq!(blueprint.outputs[0].r#type, hudl_types::OutputKind::Barchart);
    }

    #[test]
    fn assignment_parser_splits_on_first_equals() {
        assert_eq!(parse_assignment("text=a=b"), Ok(("text".to_string(), "a=b".to_string())));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn cli_parses_predict_flags() {
        let cli = Cli::try_parse_from([
            "hudl",
            "predict",
            "--set",
            "text=great day",
            "--item",
            "labels=PER",
            "--dry-run",
            "--endpoint",
            "http://localhost:8080/predict",
        ])
        .expect("parse");
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:8080/predict"));
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.set, vec![("text".to_string(), "great day".to_string())]);
        assert_eq!(args.item, vec![("labels".to_string(), "PER".to_string())]);
        assert!(args.dry_run);
        assert!(!args.skip_probe);
    }

    #[test]
    fn transform_on_text_output_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        std::fs::write(
            &path,
            "description: x\noutputs:\n  - id: o\n    type: text\n    transform:\n      type: percentage\n",
        )
        .unwrap();
        let registry = render::terminal_registry();
        assert!(load_blueprint(Some(&path), &registry).is_err());
    }
}

use clap::{Parser, ValueEnum};
use flowpub::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatCli {
    Stix,
    Cacao,
}

/// Publishes an attack-flow diagram as a STIX 2.1 bundle or a CACAO/Ermack playbook
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the diagram JSON file
    diagram_path: String,

    /// The interchange format to publish
    #[arg(short, long, value_enum, default_value = "stix")]
    format: FormatCli,

    /// Write the document to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Extra template mappings for the STIX exporter, as TEMPLATE=STIX_TYPE
    #[arg(short, long = "map", value_name = "TEMPLATE=TYPE", value_parser = parse_mapping)]
    mappings: Vec<(String, String)>,

    /// Use deterministic, sequential identifiers instead of random ones
    #[arg(long)]
    seed_ids: bool,
}

fn parse_mapping(raw: &str) -> std::result::Result<(String, String), String> {
    let (template, stix_type) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TEMPLATE=TYPE, got '{}'", raw))?;
    if template.is_empty() || stix_type.is_empty() {
        return Err(format!("empty template or type in '{}'", raw));
    }
    Ok((template.to_string(), stix_type.to_string()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run_publish(cli);
}

fn run_publish(cli: Cli) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let diagram_json = fs::read_to_string(&cli.diagram_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read diagram file '{}': {}",
            &cli.diagram_path, e
        ))
    });

    // --- 2. Parsing and Conversion ---
    let graph = DiagramDocument::from_json(&diagram_json)
        .and_then(IntoGraph::into_graph)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load diagram: {}", e)));
    tracing::info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "Diagram loaded"
    );

    // --- 3. Publisher Configuration ---
    let format = match cli.format {
        FormatCli::Stix => PublishFormat::Stix,
        FormatCli::Cacao => PublishFormat::Cacao,
    };
    let mut builder = Publisher::builder(format);
    for (template, stix_type) in &cli.mappings {
        builder = builder.with_template_mapping(template, stix_type);
    }
    if cli.seed_ids {
        builder = builder.with_id_generator(SequentialIds::new());
    }
    let publisher = builder.build();

    // --- 4. Publishing ---
    let document = publisher
        .publish(&graph)
        .unwrap_or_else(|e| exit_with_error(&format!("Publishing failed: {}", e)));

    // --- 5. Output ---
    match &cli.output {
        Some(path) => {
            fs::write(path, &document).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write output file '{}': {}", path, e))
            });
            tracing::info!(path = %path, "Document written");
        }
        None => println!("{}", document),
    }

    tracing::info!(format = ?format, elapsed = ?total_start.elapsed(), "Publishing finished");
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

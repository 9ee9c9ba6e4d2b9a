//! undocx CLI - DOCX text and knowledge-graph extraction tool

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use undocx::{ChunkingStrategy, ExtractionOrder, JsonFormat, ParseOptions, Undocx};

#[derive(Parser)]
#[command(name = "undocx")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract text from DOCX files and build knowledge-graph JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract plain text
    Text {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit all paragraphs before all tables
        #[arg(long)]
        reference_order: bool,

        /// Disable parallel extraction
        #[arg(long)]
        sequential: bool,
    },

    /// Build the knowledge graph as JSON
    Graph {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Metadata entry (repeatable)
        #[arg(short, long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        meta: Vec<(String, String)>,

        /// JSON file with a metadata object
        #[arg(long, value_name = "FILE")]
        metadata: Option<PathBuf>,

        /// Chunking strategy: by-line, by-paragraph, tokens:N[:OVERLAP], chars:N[:OVERLAP]
        #[arg(short, long, env = "UNDOCX_STRATEGY", default_value = "by-line")]
        strategy: ChunkingStrategy,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the chunks of a document
    Chunks {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Chunking strategy: by-line, by-paragraph, tokens:N[:OVERLAP], chars:N[:OVERLAP]
        #[arg(short, long, env = "UNDOCX_STRATEGY", default_value = "by-line")]
        strategy: ChunkingStrategy,
    },

    /// Show document information
    Info {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Text {
            input,
            output,
            reference_order,
            sequential,
        }) => cmd_text(&input, output.as_deref(), reference_order, sequential),
        Some(Commands::Graph {
            input,
            meta,
            metadata,
            strategy,
            compact,
            output,
        }) => cmd_graph(
            &input,
            meta,
            metadata.as_deref(),
            strategy,
            compact,
            output.as_deref(),
        ),
        Some(Commands::Chunks { input, strategy }) => cmd_chunks(&input, strategy),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: undocx <COMMAND> <FILE>".yellow());
            println!("       undocx --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {:?}", s)),
    }
}

/// Merge a metadata JSON file with `--meta` entries; entries win.
///
/// Arrays become comma-separated lists so they feed multi-valued fields.
fn load_metadata(
    file: Option<&Path>,
    entries: Vec<(String, String)>,
) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut metadata = HashMap::new();

    if let Some(path) = file {
        let content = fs::read_to_string(path)?;
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
            .map_err(|e| format!("{}: expected a JSON object ({})", path.display(), e))?;
        for (key, value) in object {
            if let Some(value) = metadata_value(&value) {
                metadata.insert(key, value);
            }
        }
    }

    metadata.extend(entries);
    Ok(metadata)
}

fn metadata_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(metadata_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    reference_order: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut undocx = Undocx::new();
    if reference_order {
        undocx = undocx.with_order(ExtractionOrder::ParagraphsThenTables);
    }
    if sequential {
        undocx = undocx.sequential();
    }

    let text = undocx.extract_text(input)?;
    write_or_print(output, &text)
}

fn cmd_graph(
    input: &Path,
    meta: Vec<(String, String)>,
    metadata_file: Option<&Path>,
    strategy: ChunkingStrategy,
    compact: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let metadata = load_metadata(metadata_file, meta)?;
    log::debug!("graph metadata: {} entries", metadata.len());
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let undocx = Undocx::new()
        .with_strategy(strategy)
        .with_json_format(format);

    if output.is_none() {
        let json = undocx.build_graph(input, &metadata)?;
        return write_or_print(None, &json);
    }

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Parsing DOCX...");
    let graph = undocx.graph(input, &metadata)?;
    pb.inc(2);

    pb.set_message("Writing JSON...");
    let json = undocx::render::to_json(&graph, format)?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    println!(
        "{} {} nodes, {} edges",
        "Graph:".green().bold(),
        graph.node_count(),
        graph.edge_count()
    );
    write_or_print(output, &json)
}

fn cmd_chunks(input: &Path, strategy: ChunkingStrategy) -> Result<(), Box<dyn std::error::Error>> {
    let text = undocx::extract_text(input)?;
    let chunks = undocx::chunk(&text, &strategy)?;

    for chunk in &chunks {
        println!("{} {}", format!("[{}]", chunk.id).cyan(), chunk.text);
    }
    eprintln!("{} {} chunks ({})", "Done!".green().bold(), chunks.len(), strategy);
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Show what we can even if core.xml is damaged
    let options = ParseOptions::new().lenient();
    let doc = undocx::parse_file_with_options(input, options)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Ok(format) = undocx::detect_format_from_path(input) {
        println!("{}: DOCX ({})", "Format".bold(), format);
    }

    let fields = [
        ("Title", &doc.metadata.title),
        ("Subject", &doc.metadata.subject),
        ("Creator", &doc.metadata.creator),
        ("Keywords", &doc.metadata.keywords),
        ("Description", &doc.metadata.description),
        ("Last modified by", &doc.metadata.last_modified_by),
        ("Revision", &doc.metadata.revision),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", name.bold(), value);
        }
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = undocx::render::to_text(&doc, &undocx::TextOptions::default());
    let words = text.split_whitespace().count();
    let chars = text.chars().count();
    let merged = doc.tables().filter(|t| t.has_merged_cells()).count();

    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Tables".bold(), doc.table_count());
    if merged > 0 {
        println!("{}: {}", "Tables with merged cells".bold(), merged);
    }
    println!("{}: {}", "Lines".bold(), text.lines().count());
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Characters".bold(), chars);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "undocx".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX text and knowledge-graph extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/undocx".dimmed());
    println!("License: MIT");
}

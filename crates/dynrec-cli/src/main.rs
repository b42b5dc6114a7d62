//! `dynrec` CLI: build records from JSON, inspect their shapes, and filter or
//! match them against patterns from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Print every shape synthesized for a document
//! dynrec shapes -i people.json
//!
//! # Keep the elements of an array that match a partial pattern
//! dynrec filter -i people.json --pattern '{"address": {"city": "Lisbon"}}'
//!
//! # Keep the elements (themselves arrays) where some item matches
//! echo '[[1, 2], [3]]' | dynrec filter --mode contains --pattern 3
//!
//! # Check one document against a pattern
//! echo '{"a": 1, "b": 2}' | dynrec match --pattern '{"a": 1}'
//!
//! # Render a template once per element into a single section
//! dynrec render -i people.json --template '<li>{name}</li>'
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dynrec_core::section::{template, SectionRenderer, Sections};
use dynrec_core::{
    filter, structural_equals, BuilderConfig, Comparator, IdentifierPolicy, RecordBuilder, Shape,
    ShapeRegistry, Value,
};
use std::collections::BTreeMap;
use std::io::{self, Read};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dynrec",
    version,
    about = "Build dynamic records from JSON and filter them by structure"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins if set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Accept any non-empty object key as a field name
    #[arg(long, global = true)]
    lenient: bool,

    /// Extra member names that object keys must not produce (repeatable)
    #[arg(long, value_name = "NAME", global = true)]
    reserved: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the shape synthesized for every object in the input
    Shapes {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Keep the elements of a JSON array that match a pattern
    Filter {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pattern document (JSON)
        #[arg(long)]
        pattern: String,
        /// How the pattern is applied to each element
        #[arg(long, value_enum, default_value_t = Mode::Value)]
        mode: Mode,
    },
    /// Print whether the input document matches a pattern
    Match {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Pattern document (JSON)
        #[arg(long)]
        pattern: String,
    },
    /// Render a `{field}` template for each element into one section
    Render {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Template applied to every element
        #[arg(long)]
        template: String,
        /// Section the content is collected under
        #[arg(long, default_value = "body")]
        section: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Each element must structurally equal the pattern
    Value,
    /// Each element is a collection whose every item equals the pattern
    All,
    /// Each element is a collection with at least one item equal to the pattern
    Contains,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = BuilderConfig::default();
    if cli.lenient {
        config = config.identifier_policy(IdentifierPolicy::Lenient);
    }
    for name in &cli.reserved {
        config = config.reserve(name.as_str());
    }

    // A private registry so shape ids start at zero for every run.
    let registry = ShapeRegistry::new();
    let builder = RecordBuilder::with_registry(&registry).with_config(config);

    match cli.command {
        Commands::Shapes { input } => {
            let document = build(&builder, &read_input(input.as_deref())?, "input")?;
            let mut shapes = BTreeMap::new();
            collect_shapes(&document, &mut shapes);
            info!(count = shapes.len(), "shapes synthesized");
            let mut out = String::new();
            for line in shapes.values() {
                out.push_str(line);
                out.push('\n');
            }
            print!("{out}");
        }
        Commands::Filter {
            input,
            output,
            pattern,
            mode,
        } => {
            let document = build(&builder, &read_input(input.as_deref())?, "input")?;
            let items = match document {
                Value::Array(items) => items,
                other => bail!("filter input must be a JSON array, got {}", other.type_name()),
            };
            let pattern = build(&builder, &pattern, "pattern")?;
            let arg = match mode {
                Mode::Value => pattern,
                Mode::All => each_as_collection(Comparator::all_eq(pattern)),
                Mode::Contains => each_as_collection(Comparator::contains_eq(pattern)),
            };

            let kept: Vec<&Value> = filter(&items, &arg).collect();
            info!(input = items.len(), kept = kept.len(), "filtered");
            let json = serde_json::to_string_pretty(&kept).context("Failed to serialize matches")?;
            write_output(output.as_deref(), &format!("{json}\n"))?;
        }
        Commands::Match { input, pattern } => {
            let document = build(&builder, &read_input(input.as_deref())?, "input")?;
            let pattern = build(&builder, &pattern, "pattern")?;
            println!("{}", structural_equals(&document, &pattern));
        }
        Commands::Render {
            input,
            output,
            template: source,
            section,
        } => {
            let document = build(&builder, &read_input(input.as_deref())?, "input")?;
            let pages = match document {
                Value::Array(items) => items,
                single => vec![single],
            };

            let mut sections = Sections::new();
            for page in &pages {
                sections.add(&section, page, template(&source));
            }
            debug!(section = %section, pages = pages.len(), "rendering");
            let rendered = sections.optional(&section).render();
            write_output(output.as_deref(), &format!("{rendered}\n"))?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

/// A bare `All`/`Contains` literal would test non-collection elements whole.
/// Under a `Value` comparator every element is walked as a collection instead.
fn each_as_collection(inner: Comparator) -> Value {
    Value::from(Comparator::value(move |item: &Value| inner.apply(item)))
}

fn build(builder: &RecordBuilder<'_>, json: &str, what: &str) -> Result<Value> {
    builder
        .build_str(json)
        .with_context(|| format!("Failed to build records from {what}"))
}

/// Every shape reachable from `value`, keyed by id so output follows
/// construction order.
fn collect_shapes(value: &Value, out: &mut BTreeMap<u64, String>) {
    match value {
        Value::Record(record) => {
            let shape: &Shape = record.shape();
            out.insert(shape.id().get(), shape.to_string());
            for (_, field) in record.fields() {
                collect_shapes(field, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_shapes(item, out);
            }
        }
        _ => {}
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

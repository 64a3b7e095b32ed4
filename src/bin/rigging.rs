//! Rigging CLI
//!
//! Inspects engine schemas and component documents from the command line.
//!
//! Usage:
//!   rigging types <schema> [--defaults <file>]
//!   rigging check <schema> <components> [--defaults <file>]
//!   rigging roundtrip <schema> <components> [--defaults <file>]
//!   rigging export --config <rigging.json> <components>

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use rigging::commit::EngineCommitSink;
use rigging::component::{self, decode_components, encode_components};
use rigging::schema::{FileSchemaProvider, SchemaRegistry};
use rigging::RiggingConfig;

#[derive(Parser, Debug)]
#[command(name = "rigging")]
#[command(about = "Inspect engine component schemas and component documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every component and enum the schema declares
    Types {
        #[command(flatten)]
        schema: SchemaArgs,
    },
    /// Decode a component sequence and report items that fail
    Check {
        #[command(flatten)]
        schema: SchemaArgs,
        /// YAML sequence of component documents
        components: PathBuf,
    },
    /// Re-encode a component sequence and report entries that change
    Roundtrip {
        #[command(flatten)]
        schema: SchemaArgs,
        /// YAML sequence of component documents
        components: PathBuf,
    },
    /// Write each component to the configured output directory
    Export {
        /// Path to a rigging.json configuration
        #[arg(long)]
        config: PathBuf,
        /// YAML sequence of component documents
        components: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Schema document exported by the engine
    schema: PathBuf,
    /// Standalone default-values document
    #[arg(long)]
    defaults: Option<PathBuf>,
}

impl SchemaArgs {
    fn load(&self) -> Result<SchemaRegistry> {
        let mut provider = FileSchemaProvider::new(&self.schema);
        if let Some(defaults) = &self.defaults {
            provider = provider.with_defaults(defaults);
        }
        SchemaRegistry::from_provider(&provider)
            .with_context(|| format!("loading schema {}", self.schema.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Types { schema } => types(&schema.load()?),
        Command::Check { schema, components } => check(&schema.load()?, &components),
        Command::Roundtrip { schema, components } => roundtrip(&schema.load()?, &components),
        Command::Export { config, components } => export(&config, &components).await,
    }
}

fn types(registry: &SchemaRegistry) -> Result<()> {
    for schema in registry.components() {
        println!("{}", schema.name());
        for (key, kind) in schema.properties() {
            println!("  {}: {}", key, kind);
        }
    }
    for (name, members) in registry.enums() {
        println!("enum {}: {}", name, members.join(", "));
    }
    Ok(())
}

fn read_components(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn check(registry: &SchemaRegistry, path: &Path) -> Result<()> {
    let decoded = decode_components(&read_components(path)?, registry)?;
    println!(
        "{}: {} loaded, {} failed",
        path.display(),
        decoded.components.len(),
        decoded.failures.len()
    );
    for failure in &decoded.failures {
        println!(
            "  #{} ({}): {}",
            failure.index,
            failure.typename.as_deref().unwrap_or("?"),
            failure.error
        );
    }
    if !decoded.is_complete() {
        bail!("{} component(s) failed to decode", decoded.failures.len());
    }
    Ok(())
}

fn roundtrip(registry: &SchemaRegistry, path: &Path) -> Result<()> {
    let decoded = decode_components(&read_components(path)?, registry)?;

    let mut mismatches = 0;
    for (position, instance) in decoded.components.to_vec().iter().enumerate() {
        let again = component::decode(&component::encode(instance), registry)?;
        if again != *instance {
            mismatches += 1;
            let index = decoded.source_index(position).unwrap_or(position);
            println!("  #{} ({}) does not round-trip", index, instance.typename());
        }
    }

    print!(
        "{}",
        serde_yaml::to_string(&encode_components(&decoded.components))?
    );
    if mismatches > 0 {
        bail!("{} component(s) did not round-trip", mismatches);
    }
    Ok(())
}

async fn export(config_path: &Path, path: &Path) -> Result<()> {
    let config = RiggingConfig::load(config_path)?;
    let registry = SchemaRegistry::from_provider(&config.schema_provider())?;
    let Some(sink) = config.commit_sink() else {
        bail!("{} has no outputDir", config_path.display());
    };

    let decoded = decode_components(&read_components(path)?, &registry)?;
    for instance in decoded.components.to_vec() {
        let document = component::encode_to_string(&instance)?;
        sink.push(&instance.instance_id(), &document)
            .await
            .with_context(|| format!("exporting {}", instance.typename()))?;
    }
    println!(
        "Exported {} component(s) to {}",
        decoded.components.len(),
        sink.root().display()
    );
    Ok(())
}

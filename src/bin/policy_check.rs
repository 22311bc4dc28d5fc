use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use gatewarden::engine::InheritanceResolver;
use gatewarden::{Context, PolicyService, RoleBinding, SchemaDocument, ValidatedSchema};

#[derive(Parser, Debug)]
#[command(author, version, about = "gatewarden policy inspection tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a schema document and print a summary
    Validate { schema: PathBuf },
    /// Print the flattened permission set for a role
    Resolve { schema: PathBuf, role: String },
    /// Print the effective permission set for a bindings file
    Effective { schema: PathBuf, bindings: PathBuf },
    /// Check one permission against a requested context
    Check {
        schema: PathBuf,
        bindings: PathBuf,
        permission: String,
        /// Context entries as dimension=value, repeatable
        #[arg(short, long = "context", value_name = "DIM=VALUE")]
        context: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { schema } => {
            let validated = load_schema(&schema)?;
            println!(
                "schema ok: {} permissions, {} roles",
                validated.permissions().count(),
                validated.roles().count()
            );
            for name in validated.role_names() {
                println!("  role {name}");
            }
        }
        Commands::Resolve { schema, role } => {
            let validated = std::sync::Arc::new(load_schema(&schema)?);
            let resolver = InheritanceResolver::new(validated);
            let permissions = resolver.resolve(&role)?;
            for permission in permissions.iter() {
                println!("{permission}");
            }
        }
        Commands::Effective { schema, bindings } => {
            let service = PolicyService::init(load_document(&schema)?)?;
            let bindings = load_bindings(&bindings)?;
            let effective = service.effective_permissions(&bindings);
            println!("{}", serde_json::to_string_pretty(effective.as_ref())?);
        }
        Commands::Check {
            schema,
            bindings,
            permission,
            context,
        } => {
            let service = PolicyService::init(load_document(&schema)?)?;
            let bindings = load_bindings(&bindings)?;
            let context = parse_context(&context)?;
            if service.is_allowed(&bindings, &permission, &context) {
                println!("allowed");
            } else {
                println!("denied");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn load_document(path: &Path) -> anyhow::Result<SchemaDocument> {
    SchemaDocument::from_json_file(path)
        .with_context(|| format!("failed to load schema from {}", path.display()))
}

fn load_schema(path: &Path) -> anyhow::Result<ValidatedSchema> {
    Ok(ValidatedSchema::load(load_document(path)?)?)
}

fn load_bindings(path: &Path) -> anyhow::Result<Vec<RoleBinding>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bindings from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid bindings file {}", path.display()))
}

fn parse_context(entries: &[String]) -> anyhow::Result<Context> {
    let mut context = Context::new();
    for entry in entries {
        let (dimension, value) = entry
            .split_once('=')
            .with_context(|| format!("context entry `{entry}` is not dimension=value"))?;
        context = context.with(dimension, value);
    }
    Ok(context)
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

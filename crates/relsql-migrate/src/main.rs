//! relsql-migrate CLI
//!
//! Prints the DDL for a table migration described in JSON files.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use relsql_core::Layout;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use relsql_migrate::{dialect_for, migrate};

/// Table migrations rendered as DDL.
#[derive(Parser)]
#[command(name = "relsql-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target database.
    #[arg(short, long, env = "RELSQL_DIALECT", value_enum, default_value_t = DialectName::Mysql)]
    dialect: DialectName,

    /// Spaces per indentation level; 0 renders each statement on one line.
    #[arg(short, long, env = "RELSQL_INDENT", default_value_t = 0)]
    indent: usize,

    /// Current table definition (JSON).
    #[arg(long)]
    definition: Option<PathBuf>,

    /// Table to create, or delta to apply to the definition (JSON).
    #[arg(long)]
    migration: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DialectName {
    Mysql,
    Postgres,
    Sqlite,
}

impl DialectName {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dialect = dialect_for(cli.dialect.as_str())
        .with_context(|| format!("unsupported dialect {}", cli.dialect.as_str()))?;
    let layout = Layout::indented(cli.indent);
    debug!(dialect = dialect.name(), indent = cli.indent, "rendering migration");

    let sql = migrate(
        cli.definition.as_deref(),
        cli.migration.as_deref(),
        dialect.as_ref(),
        layout,
    )
    .context("failed to render migration")?;

    print!("{sql}");
    Ok(())
}

//! oxide-query CLI
//!
//! Inspects a SQLite database through the typed query layer.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_query::builder::{Expressible, SqlValue, Table};
use oxide_query::{ConnectionExt, resolve_columns};
use oxide_query_sqlite::{ConnectionConfig, SqliteConnection};

/// Typed SQL queries against SQLite.
#[derive(Parser)]
#[command(name = "oxide-query")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Print the compiled SQL instead of running it.
    #[arg(long)]
    sql: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns `SELECT *` resolves to.
    Columns {
        /// Table name.
        table: String,
    },

    /// Count the rows of a table.
    Count {
        /// Table name.
        table: String,
    },

    /// Print the first rows of a table.
    Head {
        /// Table name.
        table: String,

        /// Number of rows to print.
        #[arg(short, long, default_value_t = 10)]
        limit: u64,
    },
}

/// The CLI only inspects existing databases.
fn connection_config(database: &str) -> ConnectionConfig {
    ConnectionConfig::new(database).create_if_missing(false)
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
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let query = match &cli.command {
        Commands::Columns { table } | Commands::Count { table } => Table::new(table),
        Commands::Head { table, limit } => Table::new(table.as_str()).limit(*limit),
    };

    if cli.sql {
        let sql = match &cli.command {
            Commands::Count { .. } => query.count().as_sql(),
            Commands::Columns { .. } | Commands::Head { .. } => query.as_sql(),
        };
        println!("{sql}");
        return Ok(());
    }

    let config = connection_config(&cli.database);
    let conn = SqliteConnection::open(&config)
        .with_context(|| format!("failed to open {}", config.url))?;

    match cli.command {
        Commands::Columns { table } => {
            let columns = resolve_columns(&conn, &query)?;
            let mut entries: Vec<_> = columns.iter().collect();
            entries.sort_by_key(|(_, index)| *index);

            println!("\nColumns of {table}:");
            println!("{:-<60}", "");
            for (name, index) in entries {
                println!(" {index:>3}  {name}");
            }
            println!();
        }

        Commands::Count { table } => {
            let count = conn.scalar(&query.count())?;
            info!("{table}: {count} rows");
            println!("{count}");
        }

        Commands::Head { table, .. } => {
            let rows = conn.prepare_rows(&query)?;
            let mut names: Vec<_> = rows.columns().iter().collect();
            names.sort_by_key(|(_, index)| *index);
            let header: Vec<String> = names.into_iter().map(|(name, _)| name.to_string()).collect();
            println!("{}", header.join("\t"));

            let mut printed = 0;
            for row in rows {
                let row = row?;
                let line: Vec<String> = row.values().iter().map(SqlValue::to_sql_inline).collect();
                println!("{}", line.join("\t"));
                printed += 1;
            }
            info!("{printed} rows from {table}");
        }
    }

    Ok(())
}

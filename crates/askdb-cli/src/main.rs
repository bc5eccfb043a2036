use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use askdb_core::{Config, DatabaseKind, StageUpdate};
use askdb_llm::LanguageModel;
use askdb_pipeline::Pipeline;
use askdb_store::{SqlStore, SqliteStore};

/// AskDB - ask a relational database questions in plain language
#[derive(Parser)]
#[command(name = "askdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: askdb.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server exposing POST /ask
    Serve {
        /// Listen address (overrides config)
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Ask a single question and print the pipeline trace
    Ask {
        /// The question, in plain language
        question: String,
    },

    /// List the tables a generated query may reference
    Tables,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if std::path::Path::new("askdb.toml").exists() {
        Config::from_file(std::path::Path::new("askdb.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Serve { addr } => serve_command(&config, addr, cli.verbose).await,
        Commands::Ask { question } => ask_command(&config, &question, cli.verbose).await,
        Commands::Tables => tables_command(&config, cli.verbose).await,
    }
}

/// Serve command - run the HTTP shell around the pipeline
async fn serve_command(config: &Config, addr: Option<String>, verbose: bool) -> Result<()> {
    askdb_server::init_tracing();

    let store = build_store(config).await?;
    announce_store(store.as_ref(), verbose).await?;
    let model = build_model(config)?;
    let pipeline = Arc::new(Pipeline::new(store, model, config.row_limit));

    let addr: SocketAddr = addr
        .unwrap_or_else(|| config.server.listen_addr.clone())
        .parse()?;
    askdb_server::serve(addr, pipeline).await
}

/// Ask command - run one question end to end and print each stage
async fn ask_command(config: &Config, question: &str, verbose: bool) -> Result<()> {
    let store = build_store(config).await?;
    announce_store(store.as_ref(), verbose).await?;
    let model = build_model(config)?;
    let pipeline = Pipeline::new(store, model, config.row_limit);

    let updates = pipeline.run(question).await?;
    for update in &updates {
        match update {
            StageUpdate::WriteQuery { query } => {
                println!("{} {}", "SQL:".cyan().bold(), query);
            }
            StageUpdate::ExecuteQuery { result } => {
                println!("{}\n{}", "Result:".cyan().bold(), result);
            }
            StageUpdate::GenerateAnswer { answer } => {
                println!("{} {}", "Answer:".green().bold(), answer);
            }
        }
    }
    Ok(())
}

/// Tables command - show what the query generator is allowed to use
async fn tables_command(config: &Config, verbose: bool) -> Result<()> {
    let store = build_store(config).await?;
    announce_store(store.as_ref(), verbose).await?;

    for name in store.usable_table_names().await? {
        println!("{}", name);
    }
    Ok(())
}

/// Connection smoke test plus dialect/table logging at startup
async fn announce_store(store: &dyn SqlStore, verbose: bool) -> Result<()> {
    store.test_connection().await?;
    let tables = store.usable_table_names().await?;
    tracing::info!(dialect = store.dialect(), tables = ?tables, "store connected");
    if verbose {
        eprintln!(
            "{} {} ({} tables)",
            "Connected:".cyan(),
            store.dialect(),
            tables.len()
        );
    }
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn SqlStore>> {
    match config.database.kind {
        DatabaseKind::Sqlite => Ok(Arc::new(SqliteStore::open(&config.database.url)?)),
        DatabaseKind::Postgres => {
            #[cfg(feature = "postgres")]
            {
                Ok(Arc::new(
                    askdb_store::PostgresStore::connect(&config.database.url).await?,
                ))
            }
            #[cfg(not(feature = "postgres"))]
            {
                anyhow::bail!(
                    "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                )
            }
        }
    }
}

fn build_model(config: &Config) -> Result<Arc<dyn LanguageModel>> {
    #[cfg(feature = "openai")]
    {
        let api_key = config.api_key()?;
        Ok(Arc::new(askdb_llm::OpenAiModel::new(
            &config.model.base_url,
            &config.model.model,
            api_key,
        )?))
    }
    #[cfg(not(feature = "openai"))]
    {
        let _ = config;
        anyhow::bail!(
            "No language-model backend compiled. Rebuild with: cargo build --features openai"
        )
    }
}

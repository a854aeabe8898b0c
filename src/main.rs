use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skill_forge::config::{Config, ConfigArgs};
use skill_forge::search::{self, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};
use skill_forge::state::SharedState;
use skill_forge::{api, mcp, status};

#[derive(Parser)]
#[command(name = "skill-forge")]
#[command(version, about = "Phase-by-phase guide for authoring Agent Skills, served over MCP")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server via stdio (default)
    Mcp,
    /// Start MCP server over streamable HTTP
    Serve {
        /// Port for the HTTP server
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Print phase progress from the saved state
    Status,
    /// Search every phase document for a keyword
    Search {
        query: String,

        /// Maximum number of results (1-50)
        #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,
    },
    /// Verify that every manifest heading exists in its phase document
    Check,
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "skill_forge=info,tower_http=info".into()),
    );

    if use_stderr {
        // stdout carries the protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_server(config: &Config) -> anyhow::Result<mcp::McpServer> {
    let corpus = Arc::new(config.corpus()?);
    let state = SharedState::load(config.state_store()?);
    Ok(mcp::McpServer::new(corpus, config.locale, state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Mcp);

    init_tracing(matches!(command, Commands::Mcp));
    let config = Config::from(cli.config);

    match command {
        Commands::Mcp => {
            let server = build_server(&config)?;
            mcp::run_stdio_server(server).await?;
        }
        Commands::Serve { port } => {
            tracing::info!("Starting SkillForge MCP server on port {}", port);
            let server = build_server(&config)?;
            api::run_http_server(server, port).await?;
        }
        Commands::Status => {
            if !config.persist {
                tracing::warn!("Persistence is disabled; showing a fresh session");
            }
            let corpus = config.corpus()?;
            let state = config.state_store()?.load();
            println!(
                "{}",
                status::format_status_table(&state, corpus.manifest(config.locale))
            );
        }
        Commands::Search { query, max_results } => {
            if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
                anyhow::bail!("--max-results must be between 1 and {}", MAX_RESULTS_LIMIT);
            }
            let corpus = config.corpus()?;
            let hits = search::search(&corpus, config.locale, &query, max_results);
            println!("{}", search::format_search_results(&query, &hits));
        }
        Commands::Check => {
            let corpus = config.corpus()?;
            let errors = corpus.integrity_errors();
            if errors.is_empty() {
                println!("All manifest headings found.");
            } else {
                for (locale, error) in &errors {
                    eprintln!("[{}] {}", locale, error);
                }
                anyhow::bail!("{} heading(s) missing", errors.len());
            }
        }
    }

    Ok(())
}

//! MaterialMind CLI — terminal front end for the recommendation API.
//!
//! Commands:
//! - `recommend` — ask for material recommendations and print them as a table

use clap::{Parser, Subcommand};

mod client;
mod display;

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(
    name = "materialmind",
    about = "MaterialMind — material selection advisor for mechanical engineers",
    long_about = "MaterialMind — material selection advisor for mechanical engineers.\n\n\
                  This tool only talks to a running API. Start the server with the \
                  `materialmind-api` binary; there is no `serve` subcommand.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the MaterialMind API
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Get material recommendations for a product
    Recommend {
        /// Description of the product you want to build
        description: String,

        /// Additional requirements or constraints
        #[arg(short = 'r', long = "req")]
        requirements: Option<String>,

        /// Table width in characters
        #[arg(long, default_value_t = display::DEFAULT_WIDTH)]
        width: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up API_URL from .env before clap reads the environment
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Recommend {
            description,
            requirements,
            width,
        } => {
            let api = client::ApiClient::new(&cli.api_url);
            let style = display::Style::detect();
            eprintln!("Consulting AI for material recommendations...");

            match api.recommend(&description, requirements.as_deref()).await? {
                client::Outcome::Success(result) => {
                    print!("{}", display::render_result(&result, width, style));
                }
                client::Outcome::Failure { status, body } => {
                    eprintln!("{}", display::render_error(status, &body, style));
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

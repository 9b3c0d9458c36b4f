//! Career Advisor - CLI Entry Point
//!
//! Collects the role and technology focus, then runs the consultant agent.

use std::io::{self, Write};

use career_advisor::agent::Agent;
use career_advisor::config::Config;
use career_advisor::tools;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "career-advisor",
    about = "IT career consultant driven by an LLM with live market-data tools"
)]
struct Cli {
    /// IT role to analyze (prompted for when omitted)
    area: Option<String>,

    /// Technology focus (prompted for when omitted)
    technology: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "career_advisor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let exit_code = tokio::select! {
        code = run(cli) => code,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted.");
            0
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> i32 {
    println!("======================================================================");
    println!("IT CAREER ADVISOR");
    println!("Tools: Google Jobs via SerpAPI + official certification pages");
    println!("======================================================================");

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("Check that your .env file is set up:");
            eprintln!("  OPENROUTER_API_KEY=your_key_here");
            eprintln!("  SERPAPI_API_KEY=your_key_here");
            return 1;
        }
    };

    let area = cli
        .area
        .unwrap_or_else(|| prompt_with_default("IT role", "Engenheiro de DevOps"));
    let technology = cli
        .technology
        .unwrap_or_else(|| prompt_with_default("Technology focus", "Nuvem"));

    println!("\nRole: {area}");
    println!("Technology: {technology}\n");

    let registry = match tools::default_registry(&config) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Unexpected error: {e}");
            return 1;
        }
    };

    let agent = Agent::new(config, registry);
    info!(%area, %technology, "starting consultation");

    match agent.advise(&area, &technology).await {
        Ok(plan) => {
            println!("======================================================================");
            println!("FINAL ACTION PLAN");
            println!("======================================================================");
            println!("\n{plan}\n");
            0
        }
        Err(e) => {
            eprintln!("Unexpected error: {e}");
            1
        }
    }
}

/// Read one line from stdin, falling back to a default on empty input.
fn prompt_with_default(label: &str, default: &str) -> String {
    print!("{label} (default: {default}): ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return default.to_string();
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

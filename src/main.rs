//! cobrowse - Co-browsing agent console
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cobrowse::dom::{demo_portfolio, Document, NodeSpec};
use cobrowse::llm::HttpReasoningClient;
use cobrowse::{CoBrowser, Config, Repl};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// cobrowse - Co-browsing agent console
#[derive(Parser, Debug)]
#[command(name = "cobrowse")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page fixture (JSON node tree); defaults to a built-in demo page
    #[arg(long)]
    page: Option<PathBuf>,

    /// Initial page location
    #[arg(long)]
    location: Option<String>,

    /// Reasoning backend base URL
    #[arg(long, short = 'b')]
    backend: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Report success for `input` on nodes that cannot hold text
    #[arg(long)]
    lenient_input: bool,

    /// Print the page snapshot and exit
    #[arg(long)]
    snapshot: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Write the default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_page(args: &Args) -> anyhow::Result<Document> {
    let mut doc = match &args.page {
        Some(path) => Document::from_spec(&NodeSpec::load(path)?),
        None => demo_portfolio(),
    };
    if let Some(location) = &args.location {
        doc.set_location(location.clone());
    }
    Ok(doc)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref backend) = args.backend {
        config.backend.url = backend.clone();
    }

    if args.debug {
        config.agent.debug = true;
    }

    if args.lenient_input {
        config.dispatcher.strict_input = false;
    }

    init_tracing(config.agent.debug);

    if args.init_config {
        let path = config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let document = load_page(&args)?.into_shared();
    info!(nodes = document.lock().len(), "Page loaded");

    let client = Arc::new(HttpReasoningClient::from_config(&config.backend)?);
    let mut agent = CoBrowser::new(config, document, client)?;

    if args.snapshot {
        println!("{}", agent.snapshot());
        return Ok(());
    }

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let outcome = agent.process(&prompt).await;
        println!("{}", outcome.display_text());
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::new(agent);
    repl.run().await?;

    Ok(())
}

// src/main.rs
// =============================================================================
// Entry point of repo-lens.
//
// What happens here:
// 1. Set up logging (stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments and load configuration
// 3. Build the long-lived clients once
// 4. Dispatch to the subcommand handler
// 5. Exit with 0 on success, 2 on error
//
// Everything runs on a single-threaded runtime: network calls are async but
// there is only ever one event loop.
//
// Rust concepts used:
// - #[tokio::main(flavor = "current_thread")]: one runtime thread
// - anyhow::Context: adds "could not fetch owner/repo" on top of the cause
// - {e:#}: prints the whole error chain on one line
// =============================================================================

mod analysis;
mod cli;
mod config;
mod context;
mod debounce;
mod github;
mod interactive;
mod session;
mod tree;
mod view;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::Config;
use context::AppContext;
use github::parse_repo_url;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // Unexpected errors are printed with their full context chain
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repo_lens=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config, cli.walk.build_options())?;

    match cli.command {
        Commands::Tree { repo_url, json } => handle_tree(&ctx, &repo_url, json).await,
        Commands::Analyze {
            repo_url,
            file,
            html,
        } => handle_analyze(&ctx, &repo_url, file.as_deref(), html).await,
        Commands::Interactive => {
            println!("repo-lens interactive session. Type :help for commands.");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            interactive::run(&ctx, stdin, &mut io::stdout()).await
        }
    }
}

// Handles the 'tree' subcommand
async fn handle_tree(ctx: &AppContext, repo_url: &str, json: bool) -> Result<()> {
    let repo = parse_repo_url(repo_url)?;
    let tree = ctx
        .builder
        .build(&repo)
        .await
        .with_context(|| format!("could not fetch {repo}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        let mut view = view::TreeView::new();
        view.mount();
        if let Some(rendered) = view.render(Some(&tree)) {
            print!("{rendered}");
        }
        println!();
        println!(
            "{} file(s), {} director(ies)",
            tree.count_files(),
            tree.count_dirs()
        );
    }

    Ok(())
}

// Handles the 'analyze' subcommand
//
// Parameters:
//   repo_url: repository to mirror
//   file:     path of the node to select; None selects the root
//   html:     print HTML instead of terminal text
async fn handle_analyze(
    ctx: &AppContext,
    repo_url: &str,
    file: Option<&str>,
    html: bool,
) -> Result<()> {
    let repo = parse_repo_url(repo_url)?;
    let tree = ctx
        .builder
        .build(&repo)
        .await
        .with_context(|| format!("could not fetch {repo}"))?;

    let path = file.unwrap_or("");
    let node = view::TreeView::new()
        .click(&tree, path)
        .with_context(|| format!("no file or directory at '{path}' in {repo}"))?;
    let selected = view::selection_for(node);

    let outcome = ctx.analyzer.analyze(Some(&tree), &selected).await;

    if html {
        print!("{}", analysis::render_html(outcome.text()));
    } else {
        print!("{}", analysis::render_terminal(outcome.text()));
    }

    Ok(())
}

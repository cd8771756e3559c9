// src/cli.rs
// =============================================================================
// Command-line interface, parsed with clap's derive API.
//
//   repo-lens tree <REPO_URL> [--json]
//   repo-lens analyze <REPO_URL> [--file PATH] [--html]
//   repo-lens interactive
//
// The walk options (--concurrency, --max-depth) are global so every
// subcommand that fetches a repository honours them.
// =============================================================================

use clap::{Args, Parser, Subcommand};

use crate::tree::BuildOptions;

#[derive(Parser, Debug)]
#[command(
    name = "repo-lens",
    version,
    about = "Browse a GitHub repository as a tree and ask a language model about it",
    long_about = "repo-lens mirrors a GitHub repository through the contents API, shows it as a \
                  tree, and asks a generative language model to explain the repository and a \
                  selected file."
)]
pub struct Cli {
    #[command(flatten)]
    pub walk: WalkArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct WalkArgs {
    /// Maximum number of GitHub requests in flight while building the tree
    ///
    /// The default of 1 fetches one listing or file at a time.
    #[arg(long, global = true, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Deepest directory level to descend into; deeper repositories fail
    ///
    /// Unlimited when not given.
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,
}

impl WalkArgs {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            concurrency: usize::from(self.concurrency),
            max_depth: self.max_depth,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a repository and print its tree
    ///
    /// Example: repo-lens tree https://github.com/octocat/Hello-World
    Tree {
        /// GitHub repository URL (e.g., https://github.com/user/repo)
        repo_url: String,

        /// Print the tree as JSON, file contents included
        #[arg(long)]
        json: bool,
    },

    /// Fetch a repository and ask the language model about it
    ///
    /// Example: repo-lens analyze https://github.com/octocat/Hello-World --file README
    Analyze {
        /// GitHub repository URL (e.g., https://github.com/user/repo)
        repo_url: String,

        /// Path of the node to select, relative to the repository root
        ///
        /// Selecting a directory (or nothing) sends "This is a directory."
        #[arg(long)]
        file: Option<String>,

        /// Print the analysis as HTML instead of terminal text
        #[arg(long)]
        html: bool,
    },

    /// Interactive session: type repository URLs, open nodes, analyze
    ///
    /// Every input line edits the URL field; it is fetched once it has been
    /// stable for the debounce delay. Lines starting with ':' are commands:
    /// :open <path>, :tree, :analyze, :status, :help, :quit
    Interactive,
}

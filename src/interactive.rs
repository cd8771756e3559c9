// src/interactive.rs
// =============================================================================
// The interactive session: the terminal stand-in for the single-page viewer.
//
// Every input line that does not start with ':' replaces the contents of the
// repository URL field. The field is debounced; once it settles on a URL
// that names a repository, the tree is fetched in the background and shown
// when it arrives. Commands:
//
//   :open <path>   select a node (file content or "This is a directory.")
//   :tree          show the current tree again
//   :analyze       ask the language model about the tree + selection
//   :status        show fetch / analysis state
//   :help          list commands
//   :quit          leave immediately
//
// End of input stops reading but still waits for a pending URL to settle
// and for in-flight fetches / analyses to finish, so piped scripts work.
//
// Everything runs on one event loop: background work is spawned into a
// JoinSet, and all session state is touched only from this loop.
//
// Rust concepts used:
// - tokio::select!: waits on stdin, the debouncer and background tasks at once
// - JoinSet: a task that panics still comes back, as a JoinError
// - Generic reader/writer: tests drive the loop with in-memory buffers
// =============================================================================

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::analysis::{render_terminal, AnalysisOutcome};
use crate::context::AppContext;
use crate::debounce::Debouncer;
use crate::github::FetchError;
use crate::session::{Generation, Session};
use crate::tree::TreeNode;

const HELP: &str = "\
Type a GitHub repository URL to load it. Commands:
  :open <path>   select a file or directory
  :tree          show the current tree
  :analyze       analyze the repository and the selection
  :status        show what is loading / loaded
  :help          show this help
  :quit          exit";

// What a background task hands back to the loop
enum Completion {
    Fetch(Generation, Result<TreeNode, FetchError>),
    Analysis(Generation, AnalysisOutcome),
}

enum Flow {
    Continue,
    Quit,
}

// Runs the session until :quit, or until input is closed and all pending
// work has finished.
//
// Parameters:
//   ctx:   the shared clients and configuration
//   input: lines typed by the user
//   out:   where trees, selections and analyses are printed
pub async fn run<R, W>(ctx: &AppContext, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = Session::new();
    session.view_mut().mount();

    let (debouncer, mut settled) = Debouncer::spawn(ctx.config.debounce);
    let mut debouncer = Some(debouncer);
    let mut tasks: JoinSet<Completion> = JoinSet::new();

    let mut lines = input.lines();
    let mut input_open = true;
    let mut settle_open = true;

    loop {
        if !input_open && !settle_open && tasks.is_empty() {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => {
                    let line = line.trim();
                    if let Some(command) = line.strip_prefix(':') {
                        let flow = handle_command(ctx, &mut session, command, &mut tasks, out)?;
                        if let Flow::Quit = flow {
                            break;
                        }
                    } else if let Some(debouncer) = &debouncer {
                        debouncer.push(line.to_string());
                    }
                }
                None => {
                    debug!("input closed");
                    input_open = false;
                    // Dropping the debouncer lets a pending value settle, then
                    // closes the settled channel
                    debouncer = None;
                }
            },
            text = settled.recv(), if settle_open => match text {
                Some(text) => {
                    if let Some((generation, repo)) = session.on_settled(&text) {
                        writeln!(out, "Loading {repo}...")?;
                        let builder = ctx.builder.clone();
                        tasks.spawn(async move {
                            Completion::Fetch(generation, builder.build(&repo).await)
                        });
                    }
                }
                None => settle_open = false,
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => match joined {
                Err(e) => {
                    error!(error = %e, "background task failed");
                    writeln!(out, "A background task failed (see log for details).")?;
                }
                Ok(completion) => match completion {
                    Completion::Fetch(generation, result) => {
                        let failed = result.is_err();
                        if session.complete_fetch(generation, result) {
                            if failed {
                                writeln!(out, "Could not load the repository (see log for details).")?;
                            } else if let Some(rendered) = session.render_tree() {
                                write!(out, "{rendered}")?;
                            }
                        }
                    }
                    Completion::Analysis(generation, outcome) => {
                        if session.complete_analysis(generation, &outcome) {
                            write!(out, "{}", render_terminal(outcome.text()))?;
                        }
                    }
                },
            },
        }
        out.flush()?;
    }

    Ok(())
}

fn handle_command<W: Write>(
    ctx: &AppContext,
    session: &mut Session,
    command: &str,
    tasks: &mut JoinSet<Completion>,
    out: &mut W,
) -> Result<Flow> {
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "open" => {
            if session.tree().is_none() {
                writeln!(out, "No repository loaded.")?;
            } else {
                match session.click(arg) {
                    Some(selected) => writeln!(out, "{selected}")?,
                    None => writeln!(out, "No node at '{arg}'.")?,
                }
            }
        }
        "tree" => match session.render_tree() {
            Some(rendered) => write!(out, "{rendered}")?,
            None => writeln!(out, "No repository loaded.")?,
        },
        "analyze" => {
            if !session.can_analyze() {
                writeln!(out, "(analyze is disabled until a repository is loaded)")?;
            }
            let generation = session.begin_analysis();
            let analyzer = ctx.analyzer.clone();
            let tree: Option<Arc<TreeNode>> = session.tree().cloned();
            let selected = session.selected().to_string();
            tasks.spawn(async move {
                let outcome = analyzer.analyze(tree.as_deref(), &selected).await;
                Completion::Analysis(generation, outcome)
            });
        }
        "status" => {
            writeln!(out, "fetch:    {}", session.fetch_state())?;
            writeln!(out, "analysis: {}", session.analysis_state())?;
            writeln!(out, "selected: {} bytes", session.selected().len())?;
        }
        "help" => writeln!(out, "{HELP}")?,
        "quit" | "q" => return Ok(Flow::Quit),
        other => writeln!(out, "Unknown command ':{other}'. Type :help for a list.")?,
    }

    Ok(Flow::Continue)
}

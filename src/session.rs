// src/session.rs
// =============================================================================
// State of one interactive session: the loaded tree, the selected content,
// and the two small state machines that drive the screen.
//
// Fetch:     Idle -> Loading -> Ready | Failed, and back to Loading whenever
//            a new repository URL settles.
// Analysis:  Unrequested -> Pending -> Shown | ErrorShown, restarted by every
//            analyze request.
//
// Fetches and analyses run as background tasks, so an older one can finish
// after a newer one was started. Every start hands out a Generation and
// only the result carrying the latest generation is applied; anything older
// is logged and dropped.
//
// The session itself never does I/O, which keeps it easy to test.
// =============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::analysis::AnalysisOutcome;
use crate::github::{parse_repo_url, FetchError, RepoId};
use crate::tree::TreeNode;
use crate::view::{selection_for, TreeView};

/// Tag attached to one background request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading { repo: RepoId, generation: Generation },
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Unrequested,
    Pending { generation: Generation },
    Shown(String),
    ErrorShown(String),
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchState::Idle => write!(f, "idle"),
            FetchState::Loading { repo, generation } => write!(f, "loading {repo} ({generation})"),
            FetchState::Ready => write!(f, "ready"),
            FetchState::Failed => write!(f, "failed"),
        }
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisState::Unrequested => write!(f, "not requested"),
            AnalysisState::Pending { generation } => write!(f, "pending ({generation})"),
            AnalysisState::Shown(text) => write!(f, "shown ({} chars)", text.len()),
            AnalysisState::ErrorShown(text) => write!(f, "error: {text}"),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    tree: Option<Arc<TreeNode>>,
    selected: String,
    fetch: FetchState,
    analysis: AnalysisState,
    view: TreeView,
    next_generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            tree: None,
            selected: String::new(),
            fetch: FetchState::Idle,
            analysis: AnalysisState::Unrequested,
            view: TreeView::new(),
            next_generation: 0,
        }
    }

    pub fn tree(&self) -> Option<&Arc<TreeNode>> {
        self.tree.as_ref()
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn analysis_state(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn view_mut(&mut self) -> &mut TreeView {
        &mut self.view
    }

    /// The rendered tree, when mounted and loaded.
    pub fn render_tree(&self) -> Option<String> {
        self.view.render(self.tree.as_deref())
    }

    /// Whether the analyze action is enabled.
    pub fn can_analyze(&self) -> bool {
        self.tree.is_some()
    }

    fn issue_generation(&mut self) -> Generation {
        self.next_generation += 1;
        Generation(self.next_generation)
    }

    // Called with every settled value of the URL field. Returns the fetch to
    // start, or None when the text does not name a repository (in which case
    // nothing changes).
    pub fn on_settled(&mut self, text: &str) -> Option<(Generation, RepoId)> {
        let repo = match parse_repo_url(text) {
            Ok(repo) => repo,
            Err(e) => {
                warn!(input = text, error = %e, "ignoring input that does not name a repository");
                return None;
            }
        };

        let generation = self.issue_generation();
        info!(%repo, %generation, "fetching repository");
        self.fetch = FetchState::Loading {
            repo: repo.clone(),
            generation,
        };
        Some((generation, repo))
    }

    // Applies a finished fetch. Returns true when the result was current and
    // the session changed.
    pub fn complete_fetch(
        &mut self,
        generation: Generation,
        result: Result<TreeNode, FetchError>,
    ) -> bool {
        let current = matches!(
            &self.fetch,
            FetchState::Loading { generation: latest, .. } if *latest == generation
        );
        if !current {
            info!(%generation, "discarding result of a superseded fetch");
            return false;
        }

        match result {
            Ok(tree) => {
                info!(
                    %generation,
                    files = tree.count_files(),
                    dirs = tree.count_dirs(),
                    "repository loaded"
                );
                self.tree = Some(Arc::new(tree));
                self.selected.clear();
                self.fetch = FetchState::Ready;
            }
            Err(e) => {
                // The previous tree, if any, stays on screen
                error!(%generation, error = %e, "failed to fetch repository");
                self.fetch = FetchState::Failed;
            }
        }
        true
    }

    // Selects the node at `path`. Returns the new selected content, or None
    // when no tree is loaded or no node lives at that path.
    pub fn click(&mut self, path: &str) -> Option<&str> {
        let tree = self.tree.as_ref()?;
        let node = self.view.click(tree, path)?;
        self.selected = selection_for(node);
        Some(&self.selected)
    }

    /// Marks a new analysis as pending, superseding any earlier one.
    pub fn begin_analysis(&mut self) -> Generation {
        let generation = self.issue_generation();
        self.analysis = AnalysisState::Pending { generation };
        generation
    }

    // Applies a finished analysis. Returns true when it was the latest one.
    pub fn complete_analysis(&mut self, generation: Generation, outcome: &AnalysisOutcome) -> bool {
        let current = matches!(
            &self.analysis,
            AnalysisState::Pending { generation: latest } if *latest == generation
        );
        if !current {
            info!(%generation, "discarding result of a superseded analysis");
            return false;
        }

        let text = outcome.text().to_string();
        self.analysis = match outcome {
            AnalysisOutcome::Failed => AnalysisState::ErrorShown(text),
            AnalysisOutcome::NoData | AnalysisOutcome::Shown(_) => AnalysisState::Shown(text),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://github.com/octocat/Hello-World";

    fn hello_world() -> TreeNode {
        TreeNode::dir(
            "Hello-World",
            vec![
                TreeNode::file("README", "Hello World!"),
                TreeNode::dir("docs", vec![]),
            ],
        )
    }

    fn not_found() -> FetchError {
        FetchError::MissingDownloadUrl {
            path: "README".to_string(),
        }
    }

    #[test]
    fn test_non_matching_input_changes_nothing() {
        let mut session = Session::new();
        let (generation, _) = session.on_settled(URL).unwrap();
        assert!(session.complete_fetch(generation, Ok(hello_world())));

        for text in ["", "octocat", "https://gitlab.com/a/b", "https://github.com/octocat"] {
            assert!(session.on_settled(text).is_none());
        }

        assert_eq!(session.fetch_state(), &FetchState::Ready);
        assert_eq!(session.tree().unwrap().name, "Hello-World");
    }

    #[test]
    fn test_fetch_lifecycle() {
        let mut session = Session::new();
        assert_eq!(session.fetch_state(), &FetchState::Idle);
        assert!(!session.can_analyze());

        let (generation, repo) = session.on_settled(URL).unwrap();
        assert_eq!(repo, RepoId::new("octocat", "Hello-World"));
        assert!(matches!(session.fetch_state(), FetchState::Loading { .. }));

        assert!(session.complete_fetch(generation, Ok(hello_world())));
        assert_eq!(session.fetch_state(), &FetchState::Ready);
        assert!(session.can_analyze());
    }

    #[test]
    fn test_failed_fetch_keeps_previous_tree() {
        let mut session = Session::new();
        let (first, _) = session.on_settled(URL).unwrap();
        session.complete_fetch(first, Ok(hello_world()));

        let (second, _) = session.on_settled("https://github.com/octocat/missing").unwrap();
        assert!(session.complete_fetch(second, Err(not_found())));

        assert_eq!(session.fetch_state(), &FetchState::Failed);
        assert_eq!(session.tree().unwrap().name, "Hello-World");
    }

    #[test]
    fn test_stale_fetch_result_is_discarded() {
        let mut session = Session::new();
        let (slow, _) = session.on_settled("https://github.com/octocat/slow").unwrap();
        let (fast, _) = session.on_settled(URL).unwrap();

        assert!(session.complete_fetch(fast, Ok(hello_world())));
        assert!(!session.complete_fetch(slow, Ok(TreeNode::dir("slow", vec![]))));

        assert_eq!(session.tree().unwrap().name, "Hello-World");
        assert_eq!(session.fetch_state(), &FetchState::Ready);
    }

    #[test]
    fn test_click_sets_selected_content() {
        let mut session = Session::new();
        assert!(session.click("README").is_none());

        let (generation, _) = session.on_settled(URL).unwrap();
        session.complete_fetch(generation, Ok(hello_world()));

        assert_eq!(session.click("README"), Some("Hello World!"));
        assert_eq!(session.click("docs"), Some("This is a directory."));
        assert_eq!(session.click(""), Some("This is a directory."));
        assert!(session.click("nope").is_none());
        assert_eq!(session.selected(), "This is a directory.");
    }

    #[test]
    fn test_new_tree_clears_selection() {
        let mut session = Session::new();
        let (first, _) = session.on_settled(URL).unwrap();
        session.complete_fetch(first, Ok(hello_world()));
        session.click("README");

        let (second, _) = session.on_settled(URL).unwrap();
        session.complete_fetch(second, Ok(hello_world()));
        assert_eq!(session.selected(), "");
    }

    #[test]
    fn test_render_waits_for_mount() {
        let mut session = Session::new();
        let (generation, _) = session.on_settled(URL).unwrap();
        session.complete_fetch(generation, Ok(hello_world()));

        assert!(session.render_tree().is_none());
        session.view_mut().mount();
        assert!(session.render_tree().unwrap().starts_with("Hello-World/\n"));
    }

    #[test]
    fn test_analysis_states() {
        let mut session = Session::new();
        assert_eq!(session.analysis_state(), &AnalysisState::Unrequested);

        let generation = session.begin_analysis();
        assert!(matches!(session.analysis_state(), AnalysisState::Pending { .. }));
        assert!(session.complete_analysis(generation, &AnalysisOutcome::NoData));
        assert_eq!(
            session.analysis_state(),
            &AnalysisState::Shown("No repository data available to analyze.".to_string())
        );

        let generation = session.begin_analysis();
        session.complete_analysis(generation, &AnalysisOutcome::Failed);
        assert_eq!(
            session.analysis_state(),
            &AnalysisState::ErrorShown(AnalysisOutcome::Failed.text().to_string())
        );
    }

    #[test]
    fn test_superseded_analysis_is_discarded() {
        let mut session = Session::new();
        let old = session.begin_analysis();
        let new = session.begin_analysis();

        assert!(session.complete_analysis(new, &AnalysisOutcome::Shown("new".to_string())));
        assert!(!session.complete_analysis(old, &AnalysisOutcome::Shown("old".to_string())));
        assert_eq!(session.analysis_state(), &AnalysisState::Shown("new".to_string()));
    }
}

// src/analysis/analyzer.rs
// =============================================================================
// Turns "the current tree + the selected file" into a rendered explanation.
//
// Three possible outcomes:
// - no tree loaded: a fixed message, and the model is never called
// - the model answered: its markdown text
// - anything failed: a fixed, human-readable failure message (the real error
//   only goes to the log)
// =============================================================================

use std::sync::Arc;

use tracing::{error, info};

use crate::tree::TreeNode;

use super::model::{AnalysisError, GenerativeModel};

pub const NO_DATA_MESSAGE: &str = "No repository data available to analyze.";
pub const FAILURE_MESSAGE: &str = "Error analyzing repository. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    NoData,
    Shown(String),
    Failed,
}

impl AnalysisOutcome {
    /// The markdown to display for this outcome.
    pub fn text(&self) -> &str {
        match self {
            AnalysisOutcome::NoData => NO_DATA_MESSAGE,
            AnalysisOutcome::Shown(text) => text,
            AnalysisOutcome::Failed => FAILURE_MESSAGE,
        }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn GenerativeModel>,
}

impl Analyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn analyze(&self, tree: Option<&TreeNode>, selected: &str) -> AnalysisOutcome {
        let Some(tree) = tree else {
            return AnalysisOutcome::NoData;
        };

        match self.request(tree, selected).await {
            Ok(text) => {
                info!(chars = text.len(), "analysis received");
                AnalysisOutcome::Shown(text)
            }
            Err(e) => {
                error!(error = %e, "analysis failed");
                AnalysisOutcome::Failed
            }
        }
    }

    async fn request(&self, tree: &TreeNode, selected: &str) -> Result<String, AnalysisError> {
        let prompt = build_prompt(tree, selected)?;
        self.model.generate_content(&prompt).await
    }
}

// The prompt embeds the whole tree as JSON, then the selected content
pub fn build_prompt(tree: &TreeNode, selected: &str) -> Result<String, AnalysisError> {
    let tree_json = serde_json::to_string_pretty(tree)?;

    Ok(format!(
        "You are reviewing the source repository \"{name}\".\n\
         \n\
         Here is the complete repository tree as JSON. Directories have \
         \"children\"; files have \"content\".\n\
         \n\
         {tree_json}\n\
         \n\
         The user selected the following file content:\n\
         \n\
         {selected}\n\
         \n\
         Explain what this repository does and how it is organized, then \
         explain the role of the selected file within it. Answer in markdown.",
        name = tree.name,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::ModelFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // Records prompts and answers from a fixed script
    struct ScriptedModel {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
    }

    impl ScriptedModel {
        fn new(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                reply: reply.map(str::to_string),
            })
        }
    }

    impl GenerativeModel for ScriptedModel {
        fn generate_content<'a>(&'a self, prompt: &'a str) -> ModelFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            let reply = self.reply.clone();
            Box::pin(async move {
                reply.ok_or_else(|| AnalysisError::Malformed("scripted failure".to_string()))
            })
        }
    }

    fn tree() -> TreeNode {
        TreeNode::dir("Hello-World", vec![TreeNode::file("README", "Hello World!")])
    }

    #[tokio::test]
    async fn test_no_tree_yields_no_data_without_calling_model() {
        let model = ScriptedModel::new(Some("unused"));
        let analyzer = Analyzer::new(model.clone());

        let outcome = analyzer.analyze(None, "anything").await;

        assert_eq!(outcome, AnalysisOutcome::NoData);
        assert_eq!(outcome.text(), "No repository data available to analyze.");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_returns_model_text() {
        let model = ScriptedModel::new(Some("## Structure\nOne file."));
        let analyzer = Analyzer::new(model.clone());

        let outcome = analyzer.analyze(Some(&tree()), "Hello World!").await;

        assert_eq!(outcome.text(), "## Structure\nOne file.");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"name\": \"README\""));
        assert!(prompts[0].contains("Hello World!"));
    }

    #[tokio::test]
    async fn test_failure_yields_fixed_message() {
        let model = ScriptedModel::new(None);
        let analyzer = Analyzer::new(model.clone());

        let outcome = analyzer.analyze(Some(&tree()), "This is a directory.").await;

        assert_eq!(outcome, AnalysisOutcome::Failed);
        assert_eq!(outcome.text(), FAILURE_MESSAGE);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }
}

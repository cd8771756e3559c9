// src/context.rs
// =============================================================================
// The long-lived collaborators, constructed once in main and passed to the
// command handlers: the tree builder (GitHub side) and the analyzer
// (language model side).
// =============================================================================

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::analysis::{Analyzer, GeminiClient};
use crate::config::Config;
use crate::github::ContentsClient;
use crate::tree::{BuildOptions, TreeBuilder};

pub struct AppContext {
    pub config: Config,
    pub builder: TreeBuilder,
    pub analyzer: Analyzer,
}

impl AppContext {
    pub fn new(config: Config, options: BuildOptions) -> Result<Self> {
        let contents = ContentsClient::new(config.github_api.clone(), config.github_token.as_deref())
            .context("could not create the GitHub client")?;

        let model = GeminiClient::new(
            config.gemini_api.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
        );

        Ok(Self {
            builder: TreeBuilder::new(contents, options),
            analyzer: Analyzer::new(Arc::new(model)),
            config,
        })
    }
}

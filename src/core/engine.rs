// src/core/engine.rs
use std::path::PathBuf;
use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use super::{discovery, CallGraphBuilder, Collector, ReportRenderer};

/// Main orchestration engine for Callmap
pub struct Engine {
    config: Config,
    collector: Collector,
    renderer: ReportRenderer,
}

impl Engine {
    /// Create a new engine instance
    pub async fn new() -> Result<Self> {
        let config = Config::load_or_default()?;

        debug!("Loaded configuration: {:?}", config);

        let collector = Collector::new(&config.analysis)?;
        let renderer = ReportRenderer::new();

        Ok(Self {
            config,
            collector,
            renderer,
        })
    }

    /// Analyze the project under `root` and write the mapping report into it
    pub async fn map(&mut self, root: Option<PathBuf>) -> Result<()> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        let root = root.canonicalize()?;

        info!("🔍 Mapping {}", root.display());

        let ignore = discovery::load_ignore_names(&root, &self.config.analysis.ignore_dirs)?;
        let files =
            discovery::find_source_files(&root, self.collector.file_extension(), &ignore)?;
        info!("Found {} Python files", files.len());

        let mut result = self.collector.collect(&files, &root);
        info!("Collected {} definitions", result.registry.len());

        CallGraphBuilder::build(&mut result.registry, &result.imports);

        let report = self.renderer.render(&result.registry);
        let output_path = root.join(&self.config.output.file_name);
        std::fs::write(&output_path, report)?;

        info!("✅ Mapping written: {}", output_path.display());
        println!("Wrote {}", self.config.output.file_name);

        Ok(())
    }
}

use clap::Parser;
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "callmap")]
#[command(about = "The Project Mapper That Shows What Calls What")]
#[command(version)]
pub struct Cli {
    /// Project root to analyze (defaults to the current directory)
    pub root: Option<PathBuf>,
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        engine.map(self.root).await
    }
}

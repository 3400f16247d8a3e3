//! Serve command handler.

use clap::Args;
use lifecapsule_core::{AppConfig, AppResult};
use lifecapsule_diary::DiaryService;
use std::sync::Arc;

/// Run the diary HTTP server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (e.g. 127.0.0.1:5000)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(self, mut config: AppConfig) -> AppResult<()> {
        if let Some(bind) = self.bind {
            config.bind = bind;
            config.validate()?;
        }

        tracing::info!(diary = ?config.diary_file(), "Starting diary server");

        let service = Arc::new(DiaryService::from_config(&config)?);

        // A diary the model can't index yet is not fatal; saving retries
        match service.rebuild_knowledge_base().await {
            Ok(Some(stats)) => {
                tracing::info!(chunks = stats.chunks_count, "Knowledge base updated")
            }
            Ok(None) => tracing::info!("No entries found in the diary. Knowledge base is empty."),
            Err(e) => tracing::warn!("Could not index diary at startup: {}", e),
        }

        lifecapsule_server::run_server(service, &config.bind).await
    }
}

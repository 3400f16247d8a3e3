//! Stats command handler.

use clap::Args;
use lifecapsule_core::{AppConfig, AppResult};
use lifecapsule_diary::{DiaryService, DiaryStats};

/// Show diary and knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Build the knowledge base to report chunk statistics (calls the embedding model)
    #[arg(long)]
    pub index: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Stats options: {:?}", self);

        let service = DiaryService::from_config(config)?;
        if self.index {
            service.rebuild_knowledge_base().await?;
        }
        let stats = service.stats().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print!("{}", render(&stats));
        }
        Ok(())
    }
}

fn render(stats: &DiaryStats) -> String {
    let mut out = format!(
        "Diary: {}\nEntries: {}\nSize: {} bytes\n",
        stats.diary_path.display(),
        stats.entries,
        stats.diary_bytes
    );

    match &stats.knowledge_base {
        Some(kb) => out.push_str(&format!(
            "Knowledge base: {} chunks, {} dimensions ({}), built in {:.2}s\n",
            kb.chunks_count, kb.embedding_dim, kb.embedding_model, kb.duration_secs
        )),
        None => out.push_str("Knowledge base: not built (use --index)\n"),
    }
    out
}

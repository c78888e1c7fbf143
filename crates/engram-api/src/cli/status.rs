//! `engram status` command.

use sqlx::Row;

use crate::state::AppState;

/// Show service status: data directory, row counts, analytics state.
pub async fn status(state: &AppState, json: bool) -> anyhow::Result<()> {
    let active_memories: i64 =
        sqlx::query("SELECT COUNT(*) AS n FROM memories WHERE superseded_by IS NULL")
            .fetch_one(&state.db_pool.reader)
            .await?
            .try_get("n")?;
    let superseded_memories: i64 =
        sqlx::query("SELECT COUNT(*) AS n FROM memories WHERE superseded_by IS NOT NULL")
            .fetch_one(&state.db_pool.reader)
            .await?
            .try_get("n")?;
    let inferences: i64 = sqlx::query("SELECT COUNT(*) AS n FROM llm_inferences")
        .fetch_one(&state.db_pool.reader)
        .await?
        .try_get("n")?;

    let analytics_enabled = state.config.analytics.api_key.is_some();

    if json {
        let status = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "active_memories": active_memories,
            "superseded_memories": superseded_memories,
            "llm_inferences": inferences,
            "analytics_enabled": analytics_enabled,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!();
        println!(
            "  {} Engram status",
            console::style("🧠").bold()
        );
        println!();
        println!(
            "  Data dir:            {}",
            console::style(state.data_dir.display()).cyan()
        );
        println!("  Active memories:     {active_memories}");
        println!("  Superseded memories: {superseded_memories}");
        println!("  LLM inferences:      {inferences}");
        println!(
            "  Analytics:           {}",
            if analytics_enabled {
                console::style("enabled").green()
            } else {
                console::style("disabled").dim()
            }
        );
        println!();
    }

    Ok(())
}

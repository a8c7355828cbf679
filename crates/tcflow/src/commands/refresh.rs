use crate::workspace::Workspace;
use colored::Colorize;

pub async fn handle(workspace: &Workspace) -> anyhow::Result<()> {
    let provider = workspace.provider()?;
    let engine = workspace.engine(&provider);

    let lock = workspace.state.acquire_lock().await?;
    let mut state = workspace.state.load().await?;

    println!("{}", "Refreshing state...".yellow());
    let removed = engine.refresh(&mut state).await?;
    workspace.state.save(&state).await?;
    lock.release().await?;

    for address in &removed {
        println!("  {} {} (gone)", "-".red(), address);
    }
    println!(
        "{}",
        format!(
            "✓ {} resource(s) refreshed, {} removed",
            state.resources.len(),
            removed.len()
        )
        .green()
        .bold()
    );
    Ok(())
}

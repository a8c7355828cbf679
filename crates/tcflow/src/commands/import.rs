use crate::workspace::Workspace;
use colored::Colorize;

pub async fn handle(workspace: &Workspace, address: &str, id: &str) -> anyhow::Result<()> {
    let provider = workspace.provider()?;
    let engine = workspace.engine(&provider);

    let lock = workspace.state.acquire_lock().await?;
    let mut state = workspace.state.load().await?;

    println!("{}", format!("Importing {} as {}...", id, address).yellow());
    engine.import(address, id, &mut state).await?;
    workspace.state.save(&state).await?;
    lock.release().await?;

    println!("{}", format!("✓ Imported {}", address).green().bold());
    if !workspace.manifest.resource_set().contains(address) {
        println!(
            "{}",
            format!(
                "ℹ {} is not declared in {}; the next apply will delete it",
                address,
                workspace.manifest_path.display()
            )
            .dimmed()
        );
    }
    Ok(())
}

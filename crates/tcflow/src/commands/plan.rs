use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;

pub async fn handle(workspace: &Workspace, refresh: bool) -> anyhow::Result<()> {
    let provider = workspace.provider()?;
    let engine = workspace.engine(&provider);

    let mut state = workspace.state.load().await?;
    if refresh {
        println!("{}", "Refreshing state...".yellow());
        engine.refresh(&mut state).await?;
    }

    let plan = engine.plan(&workspace.manifest.resource_set(), &state)?;
    if !utils::has_changes(&plan) {
        println!(
            "{}",
            "✓ No changes. Infrastructure matches the manifest.".green().bold()
        );
        return Ok(());
    }

    println!();
    utils::print_plan(&plan);
    Ok(())
}

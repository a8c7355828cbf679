use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;
use tcflow_cloud::ResourceSet;

pub async fn handle(workspace: &Workspace, yes: bool, target: Option<&str>) -> anyhow::Result<()> {
    let provider = workspace.provider()?;
    let engine = workspace.engine(&provider);

    let lock = workspace.state.acquire_lock().await?;
    let mut state = workspace.state.load().await?;

    let plan = engine.destroy_plan(&state, target)?;
    if plan.actions.is_empty() {
        println!("{}", "ℹ Nothing to destroy".dimmed());
        lock.release().await?;
        return Ok(());
    }

    println!();
    utils::print_plan(&plan);
    println!();

    if !yes && !utils::confirm(&"Destroy these resources?".red().bold().to_string())? {
        println!("{}", "Destroy cancelled".dimmed());
        lock.release().await?;
        return Ok(());
    }

    let result = engine.apply(&plan, &ResourceSet::new(), &mut state).await;
    workspace.state.save(&state).await?;
    lock.release().await?;

    utils::report(&result)
}

use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;

pub async fn handle(workspace: &Workspace, yes: bool, refresh: bool) -> anyhow::Result<()> {
    let provider = workspace.provider()?;
    let engine = workspace.engine(&provider);
    let desired = workspace.manifest.resource_set();

    let lock = workspace.state.acquire_lock().await?;
    let mut state = workspace.state.load().await?;

    if refresh {
        println!("{}", "Refreshing state...".yellow());
        engine.refresh(&mut state).await?;
    }

    let plan = engine.plan(&desired, &state)?;
    if !utils::has_changes(&plan) {
        println!(
            "{}",
            "✓ No changes. Infrastructure matches the manifest.".green().bold()
        );
        lock.release().await?;
        return Ok(());
    }

    println!();
    utils::print_plan(&plan);
    println!();

    if !yes && !utils::confirm("Apply these changes?")? {
        println!("{}", "Apply cancelled".dimmed());
        lock.release().await?;
        return Ok(());
    }

    let result = engine.apply(&plan, &desired, &mut state).await;
    // State is saved even when some actions failed so created resources are not lost
    workspace.state.save(&state).await?;
    lock.release().await?;

    utils::report(&result)
}

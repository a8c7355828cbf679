use crate::workspace::Workspace;
use colored::Colorize;

pub async fn handle(workspace: &Workspace) -> anyhow::Result<()> {
    let data = workspace.manifest.data_set();
    if data.is_empty() {
        println!("{}", "ℹ No data sources declared".dimmed());
        return Ok(());
    }

    let provider = workspace.provider()?;
    let engine = workspace.engine(&provider);

    for (address, result) in engine.query(&data).await? {
        println!("{} {}", address.cyan().bold(), format!("({})", result.id).dimmed());
        let mut attributes: Vec<_> = result.attributes.iter().collect();
        attributes.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in attributes {
            println!("  {} = {}", key, serde_json::to_string_pretty(value)?);
        }
        println!();
    }
    Ok(())
}

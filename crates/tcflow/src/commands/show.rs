use crate::workspace::{self, Workspace};
use colored::Colorize;
use tcflow_cloud::{Context, Engine, ResourceStatus};

pub async fn handle(workspace: &Workspace, address: Option<&str>) -> anyhow::Result<()> {
    let state = workspace.state.load().await?;
    let provider = workspace::offline_provider()?;
    let engine = Engine::new(&provider, Context::new());

    let addresses: Vec<String> = state
        .addresses()
        .into_iter()
        .filter(|a| address.is_none_or(|wanted| a == wanted))
        .collect();

    if addresses.is_empty() {
        match address {
            Some(wanted) => anyhow::bail!("{} is not in state", wanted),
            None => {
                println!("{}", "ℹ No resources in state".dimmed());
                return Ok(());
            }
        }
    }

    for address in addresses {
        let Some(resource) = state.get_resource(&address) else {
            continue;
        };
        let status = match resource.status {
            ResourceStatus::Present => resource.status.to_string().green(),
            ResourceStatus::Tainted => resource.status.to_string().red(),
        };
        println!("{} {} [{}]", address.cyan().bold(), resource.id, status);

        let attributes = match engine.resource(&resource.resource_type) {
            Ok(r) => r.schema().redacted(&resource.attributes),
            Err(_) => resource.attributes.clone(),
        };
        let mut attributes: Vec<_> = attributes.into_iter().collect();
        attributes.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in attributes {
            println!("  {} = {}", key, value);
        }
        println!(
            "  {}",
            format!("updated {}", resource.updated_at.to_rfc3339()).dimmed()
        );
        println!();
    }
    Ok(())
}

use crate::workspace;
use colored::Colorize;
use std::path::PathBuf;
use tcflow_cloud::CloudProvider;
use tcflow_config::{ConfigError, Manifest, ProviderSettings};

/// The manifest is optional here; it only contributes the region
pub async fn handle(file: Option<PathBuf>) -> anyhow::Result<()> {
    let settings = match file.map(Ok).unwrap_or_else(tcflow_config::find_manifest) {
        Ok(path) => Manifest::load(&path)?.provider,
        Err(ConfigError::ManifestNotFound) => ProviderSettings::default(),
        Err(e) => return Err(e.into()),
    };

    let provider = workspace::provider(&settings)?;
    println!(
        "Checking {} credentials ({})...",
        provider.display_name(),
        provider.region().cyan()
    );

    let status = provider.check_auth().await?;
    if status.authenticated {
        println!(
            "{}",
            format!(
                "✓ Authenticated as {}",
                status.account_info.unwrap_or_default()
            )
            .green()
            .bold()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "authentication failed: {}",
            status.error.unwrap_or_default()
        )
    }
}

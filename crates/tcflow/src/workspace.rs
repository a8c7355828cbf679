use anyhow::Context as _;
use std::path::PathBuf;
use tcflow_cloud::{Context, Engine, StateManager};
use tcflow_config::{Manifest, ProviderSettings};
use tcflow_tencent::{TencentCloudProvider, TencentConfig};
use tokio_util::sync::CancellationToken;

/// Manifest plus the state directory that belongs to it
pub struct Workspace {
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub state: StateManager,
}

impl Workspace {
    pub fn open(file: Option<PathBuf>) -> anyhow::Result<Self> {
        let manifest_path = match file {
            Some(path) => path,
            None => tcflow_config::find_manifest()?,
        };
        let manifest = Manifest::load(&manifest_path)
            .with_context(|| format!("failed to load {}", manifest_path.display()))?;
        let state = StateManager::new(tcflow_config::project_root(&manifest_path));

        Ok(Self {
            manifest_path,
            manifest,
            state,
        })
    }

    /// Provider with credentials from the environment
    pub fn provider(&self) -> anyhow::Result<TencentCloudProvider> {
        provider(&self.manifest.provider)
    }

    /// Context with manifest timeouts, cancelled on Ctrl-C
    pub fn context(&self) -> Context {
        Context::new()
            .with_timeouts(self.manifest.provider.timeouts())
            .with_cancellation(cancel_on_ctrl_c())
    }

    pub fn engine(&self, provider: &TencentCloudProvider) -> Engine {
        Engine::new(provider, self.context())
    }
}

pub fn provider(settings: &ProviderSettings) -> anyhow::Result<TencentCloudProvider> {
    let mut config = TencentConfig::from_env()?;
    if let Some(region) = &settings.region {
        config = config.with_region(region.clone());
    }
    tracing::debug!("Tencent Cloud region: {}", config.region);
    Ok(TencentCloudProvider::new(config)?)
}

/// Provider used only for schema lookups; it never talks to the API
pub fn offline_provider() -> anyhow::Result<TencentCloudProvider> {
    Ok(TencentCloudProvider::new(TencentConfig::new("", ""))?)
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the in-flight request");
            child.cancel();
        }
    });
    token
}

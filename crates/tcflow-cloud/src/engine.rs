//! Plan/apply engine
//!
//! Compares declared resources with the state file, plans the actions needed
//! to converge them, and applies those actions one at a time through the
//! [`Lifecycle`] driver.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::lifecycle::Lifecycle;
use crate::provider::{CloudProvider, ResourceSet};
use crate::resource::{DataResult, DataSource, Resource};
use crate::retry::Context;
use crate::schema::Attributes;
use crate::state::{GlobalState, ResourceState, ResourceStatus};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Engine {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
    ctx: Context,
}

impl Engine {
    pub fn new(provider: &dyn CloudProvider, ctx: Context) -> Self {
        Self::from_parts(provider.resources(), provider.data_sources(), ctx)
    }

    pub fn from_parts(
        resources: Vec<Arc<dyn Resource>>,
        data_sources: Vec<Arc<dyn DataSource>>,
        ctx: Context,
    ) -> Self {
        Self {
            resources: resources.into_iter().map(|r| (r.type_name(), r)).collect(),
            data_sources: data_sources
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
            ctx,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    pub fn resource(&self, resource_type: &str) -> Result<&dyn Resource> {
        self.resources
            .get(resource_type)
            .map(|r| r.as_ref())
            .ok_or_else(|| CloudError::UnknownResourceType(resource_type.to_string()))
    }

    pub fn data_source(&self, data_type: &str) -> Result<&dyn DataSource> {
        self.data_sources
            .get(data_type)
            .map(|d| d.as_ref())
            .ok_or_else(|| CloudError::UnknownResourceType(data_type.to_string()))
    }

    fn lifecycle(&self, resource_type: &str) -> Result<Lifecycle<'_>> {
        Ok(Lifecycle::new(self.resource(resource_type)?, &self.ctx))
    }

    /// Compute the actions that converge `state` towards `desired`
    ///
    /// No remote calls are made; run [`Engine::refresh`] first to plan
    /// against the live state.
    pub fn plan(&self, desired: &ResourceSet, state: &GlobalState) -> Result<Plan> {
        let mut actions = Vec::new();

        for declared in desired.iter() {
            let address = declared.address();
            let resource = self.resource(&declared.resource_type)?;
            let config = self
                .lifecycle(&declared.resource_type)?
                .prepare(&declared.config)
                .map_err(|e| at_address(&address, e))?;

            let Some(current) = state.get_resource(&address) else {
                actions.push(Action::new(
                    ActionType::Create,
                    &declared.resource_type,
                    &address,
                    None,
                ));
                continue;
            };

            let remote_id = Some(current.id.clone());
            if current.status == ResourceStatus::Tainted {
                actions.push(
                    Action::new(ActionType::Replace, &declared.resource_type, &address, remote_id)
                        .with_detail("tainted", serde_json::json!(true)),
                );
                continue;
            }

            let diff = resource.schema().diff(&current.attributes, &config);
            let action = if diff.requires_replace() {
                Action::new(ActionType::Replace, &declared.resource_type, &address, remote_id)
                    .with_detail("force_new", serde_json::json!(diff.force_new))
            } else if !diff.is_empty() {
                Action::new(ActionType::Update, &declared.resource_type, &address, remote_id)
                    .with_detail("changed", serde_json::json!(diff.in_place))
            } else {
                Action::new(ActionType::NoOp, &declared.resource_type, &address, remote_id)
            };
            actions.push(action);
        }

        for address in state.addresses() {
            if desired.contains(&address) {
                continue;
            }
            if let Some(current) = state.get_resource(&address) {
                self.resource(&current.resource_type)?;
                actions.push(Action::new(
                    ActionType::Delete,
                    &current.resource_type,
                    &address,
                    Some(current.id.clone()),
                ));
            }
        }

        Ok(Plan::new(actions))
    }

    /// Plan the deletion of every resource in state, or only `target`
    pub fn destroy_plan(&self, state: &GlobalState, target: Option<&str>) -> Result<Plan> {
        let addresses = match target {
            Some(address) => {
                if state.get_resource(address).is_none() {
                    return Err(CloudError::ResourceNotFound(address.to_string()));
                }
                vec![address.to_string()]
            }
            None => {
                let mut all = state.addresses();
                all.reverse();
                all
            }
        };

        let mut actions = Vec::new();
        for address in addresses {
            if let Some(current) = state.get_resource(&address) {
                self.resource(&current.resource_type)?;
                actions.push(Action::new(
                    ActionType::Delete,
                    &current.resource_type,
                    &address,
                    Some(current.id.clone()),
                ));
            }
        }
        Ok(Plan::new(actions))
    }

    /// Apply planned actions in order, updating `state` after each success
    pub async fn apply(
        &self,
        plan: &Plan,
        desired: &ResourceSet,
        state: &mut GlobalState,
    ) -> ApplyResult {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if self.ctx.is_cancelled() {
                result.add_failure(action.id.clone(), "cancelled".to_string());
                continue;
            }

            match self.apply_action(action, desired, state).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    tracing::error!("{} failed: {}", action.description, e);
                    result.add_failure(action.id.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn apply_action(
        &self,
        action: &Action,
        desired: &ResourceSet,
        state: &mut GlobalState,
    ) -> Result<String> {
        let address = &action.address;
        let lifecycle = self.lifecycle(&action.resource_type)?;

        match action.action_type {
            ActionType::NoOp => Ok(format!("{} unchanged", address)),
            ActionType::Create => {
                let config = declared_config(desired, address)?;
                self.create_into(&lifecycle, address, config, state).await
            }
            ActionType::Update => {
                let config = declared_config(desired, address)?;
                let prior = persisted(state, address)?;
                let next = lifecycle.update(&prior, config).await?;
                state.set_resource(address.clone(), next);
                Ok(format!("updated {} ({})", address, prior.id))
            }
            ActionType::Replace => {
                let config = declared_config(desired, address)?;
                let prior = persisted(state, address)?;
                lifecycle.delete(&prior.id).await?;
                state.remove_resource(address);
                self.create_into(&lifecycle, address, config, state).await
            }
            ActionType::Delete => {
                let prior = persisted(state, address)?;
                lifecycle.delete(&prior.id).await?;
                state.remove_resource(address);
                Ok(format!("deleted {} ({})", address, prior.id))
            }
        }
    }

    async fn create_into(
        &self,
        lifecycle: &Lifecycle<'_>,
        address: &str,
        config: &Attributes,
        state: &mut GlobalState,
    ) -> Result<String> {
        let created = lifecycle.create(config).await?;
        let id = created.id.clone();
        let tainted = created.status == ResourceStatus::Tainted;
        state.set_resource(address.to_string(), created);

        if tainted {
            return Err(CloudError::ApiError(format!(
                "{} was created as {} but could not be read back; it will be replaced on the next apply",
                address, id
            )));
        }
        Ok(format!("created {} ({})", address, id))
    }

    /// Re-read every resource in state, dropping the ones that disappeared
    ///
    /// Returns the addresses that were removed.
    pub async fn refresh(&self, state: &mut GlobalState) -> Result<Vec<String>> {
        let mut removed = Vec::new();

        for address in state.addresses() {
            let prior = persisted(state, &address)?;
            let lifecycle = self.lifecycle(&prior.resource_type)?;

            match lifecycle.read(&prior.id, Some(&prior)).await? {
                Some(mut next) => {
                    if prior.status == ResourceStatus::Tainted {
                        next.status = ResourceStatus::Tainted;
                    }
                    state.set_resource(address, next);
                }
                None => {
                    tracing::warn!("{} ({}) is gone, removing from state", address, prior.id);
                    state.remove_resource(&address);
                    removed.push(address);
                }
            }
        }

        Ok(removed)
    }

    /// Adopt an existing remote entity under `address`
    pub async fn import(&self, address: &str, id: &str, state: &mut GlobalState) -> Result<()> {
        let (resource_type, _name) = address.split_once('.').ok_or_else(|| {
            CloudError::InvalidConfig(format!(
                "invalid address `{}`, expected <type>.<name>",
                address
            ))
        })?;

        if state.get_resource(address).is_some() {
            return Err(CloudError::ResourceAlreadyExists(address.to_string()));
        }

        let imported = self.lifecycle(resource_type)?.import(id).await?;
        tracing::info!("Imported {} as {}", id, address);
        state.set_resource(address.to_string(), imported);
        Ok(())
    }

    /// Evaluate declared data sources
    pub async fn query(&self, data: &ResourceSet) -> Result<Vec<(String, DataResult)>> {
        let mut results = Vec::new();

        for declared in data.iter() {
            let address = declared.address();
            let source = self.data_source(&declared.resource_type)?;

            let mut args = declared.config.clone();
            source.schema().apply_defaults(&mut args);
            source
                .schema()
                .validate(&args)
                .map_err(|e| at_address(&address, e))?;

            tracing::debug!("Reading data source {}", address);
            let result = source.read(&self.ctx, &args).await?;
            results.push((address, result));
        }

        Ok(results)
    }
}

fn declared_config<'a>(
    desired: &'a ResourceSet,
    address: &str,
) -> Result<&'a Attributes> {
    desired
        .get(address)
        .map(|r| &r.config)
        .ok_or_else(|| CloudError::InvalidConfig(format!("{} is not declared", address)))
}

fn persisted(state: &GlobalState, address: &str) -> Result<ResourceState> {
    state
        .get_resource(address)
        .cloned()
        .ok_or_else(|| CloudError::StateError(format!("{} is not in state", address)))
}

fn at_address(address: &str, err: CloudError) -> CloudError {
    match err {
        CloudError::InvalidConfig(msg) => CloudError::InvalidConfig(format!("{}: {}", address, msg)),
        other => other,
    }
}

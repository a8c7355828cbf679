//! Lifecycle driver around a [`Resource`]
//!
//! Enforces the create/read/update/delete contract every resource shares:
//! configuration is validated before any remote call, Create is followed by a
//! Read, ForceNew fields are never updated in place, and deleting an absent
//! resource succeeds.

use crate::error::{CloudError, Result};
use crate::id::ResourceId;
use crate::resource::Resource;
use crate::retry::{Context, RetryError, retry};
use crate::schema::Attributes;
use crate::state::{ResourceState, ResourceStatus};
use chrono::Utc;

pub struct Lifecycle<'a> {
    resource: &'a dyn Resource,
    ctx: &'a Context,
}

impl<'a> Lifecycle<'a> {
    pub fn new(resource: &'a dyn Resource, ctx: &'a Context) -> Self {
        Self { resource, ctx }
    }

    pub fn parse_id(&self, raw: &str) -> Result<ResourceId> {
        ResourceId::parse(raw, self.resource.id_segments())
    }

    /// Validate a configuration and fill its defaults
    pub fn prepare(&self, config: &Attributes) -> Result<Attributes> {
        let schema = self.resource.schema();
        let mut config = config.clone();
        schema.apply_defaults(&mut config);
        schema.validate(&config)?;
        self.resource.validate(&config)?;
        Ok(config)
    }

    /// Create the resource and read back its full state
    ///
    /// When the follow-up read does not succeed within the read timeout the
    /// returned state is marked [`ResourceStatus::Tainted`], so the caller can
    /// persist the ID and replace it later.
    pub async fn create(&self, config: &Attributes) -> Result<ResourceState> {
        let config = self.prepare(config)?;
        let type_name = self.resource.type_name();

        tracing::info!("Creating {}", type_name);
        let id = self.resource.create(self.ctx, &config).await?;
        tracing::info!("Created {} ({})", type_name, id);

        let read = retry(
            self.ctx,
            &format!("{} {} to become readable", type_name, id),
            self.ctx.read_timeout(),
            || async {
                match self.resource.read(self.ctx, &id).await {
                    Ok(Some(attrs)) => Ok(attrs),
                    Ok(None) => Err(RetryError::Retryable(CloudError::ResourceNotFound(
                        id.to_string(),
                    ))),
                    Err(e) => Err(e.into()),
                }
            },
        )
        .await;

        let state = ResourceState::new(id.to_string(), type_name);
        match read {
            Ok(attrs) => Ok(state.with_attributes(self.merge(attrs, &config))),
            Err(e) => {
                tracing::warn!("{} {} was created but could not be read: {}", type_name, id, e);
                Ok(state
                    .with_status(ResourceStatus::Tainted)
                    .with_attributes(config))
            }
        }
    }

    /// Read the resource by ID; `None` when the remote reports it absent
    ///
    /// Settable fields the API does not echo back are carried over from
    /// `prior`.
    pub async fn read(
        &self,
        id: &str,
        prior: Option<&ResourceState>,
    ) -> Result<Option<ResourceState>> {
        let id = self.parse_id(id)?;

        let Some(attrs) = self.resource.read(self.ctx, &id).await? else {
            tracing::info!("{} {} no longer exists", self.resource.type_name(), id);
            return Ok(None);
        };

        let state = match prior {
            Some(prior) => {
                let mut state = prior.clone();
                state.attributes = self.merge(attrs, &prior.attributes);
                state.status = ResourceStatus::Present;
                state.updated_at = Utc::now();
                state
            }
            None => ResourceState::new(id.to_string(), self.resource.type_name())
                .with_attributes(attrs),
        };

        Ok(Some(state))
    }

    /// Apply a new configuration in place
    ///
    /// Changes to ForceNew fields are rejected before any remote call.
    pub async fn update(
        &self,
        prior: &ResourceState,
        config: &Attributes,
    ) -> Result<ResourceState> {
        let id = self.parse_id(&prior.id)?;
        let config = self.prepare(config)?;

        let diff = self.resource.schema().diff(&prior.attributes, &config);
        if let Some(field) = diff.force_new.first() {
            return Err(CloudError::ImmutableField {
                resource_type: self.resource.type_name().to_string(),
                field: field.clone(),
            });
        }
        if diff.is_empty() {
            return Ok(prior.clone());
        }

        tracing::info!(
            "Updating {} {} ({})",
            self.resource.type_name(),
            id,
            diff.in_place.join(", ")
        );
        self.resource.update(self.ctx, &id, &config, &diff).await?;

        let mut next = prior.clone();
        next.attributes = config;
        self.read(&prior.id, Some(&next))
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(prior.id.clone()))
    }

    /// Delete the resource; an already-absent resource is not an error
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = self.parse_id(id)?;
        tracing::info!("Deleting {} {}", self.resource.type_name(), id);

        match self.resource.delete(self.ctx, &id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} already absent", self.resource.type_name(), id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Reconstruct state from an ID alone
    pub async fn import(&self, id: &str) -> Result<ResourceState> {
        self.read(id, None)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))
    }

    /// Overlay remote attributes on known settable values the API omits
    fn merge(&self, mut remote: Attributes, known: &Attributes) -> Attributes {
        for field in self.resource.schema().settable_fields() {
            let missing = remote.get(&field.name).is_none_or(|v| v.is_null());
            if missing {
                if let Some(value) = known.get(&field.name) {
                    remote.insert(field.name.clone(), value.clone());
                }
            }
        }
        remote
    }
}

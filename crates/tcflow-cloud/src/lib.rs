//! tcflow cloud core
//!
//! Vendor-neutral building blocks for managing cloud resources declaratively:
//! schemas, composite resource IDs, the retry-until-timeout loop, the
//! resource lifecycle contract and the plan/apply engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   tcflow CLI                     │
//! │          (plan / apply / import / ...)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 tcflow-cloud                     │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │    Engine    │──▶ Lifecycle (CRUD contract) │ │
//! │  └──────┬───────┘  └────────────┬─────────────┘ │
//! │  ┌──────▼───────┐  ┌────────────▼─────────────┐ │
//! │  │  State Mgmt  │  │ trait Resource + retry() │ │
//! │  └──────────────┘  └──────────────────────────┘ │
//! └─────────────────────────┬───────────────────────┘
//!                           │
//!                   ┌───────▼────────┐
//!                   │ tencent-cloud  │
//!                   │    provider    │
//!                   └────────────────┘
//! ```

pub mod action;
pub mod engine;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod provider;
pub mod resource;
pub mod retry;
pub mod schema;
pub mod state;

#[cfg(test)]
mod mock;

// Re-exports
pub use action::{Action, ActionType, ApplyResult, Plan, PlanSummary};
pub use engine::Engine;
pub use error::{CloudError, Result};
pub use id::{ID_SEPARATOR, ResourceId};
pub use lifecycle::Lifecycle;
pub use provider::{AuthStatus, CloudProvider, ResourceConfig, ResourceSet};
pub use resource::{AttributesExt, DataResult, DataSource, Resource, ids_hash};
pub use retry::{Context, RetryConfig, RetryError, Timeouts, retry, retryable};
pub use schema::{Attributes, Diff, Field, FieldType, Schema};
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};

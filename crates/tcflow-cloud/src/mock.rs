//! In-memory resource used by the unit tests

use crate::error::{CloudError, Result};
use crate::id::ResourceId;
use crate::resource::{AttributesExt, DataResult, DataSource, Resource, ids_hash};
use crate::retry::Context;
use crate::schema::{Attributes, Diff, Field, Schema};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const MEMORY_TYPE: &str = "memory_thing";

/// Resource backed by a map; IDs are `<name>#mem-<n>`
pub struct MemoryResource {
    schema: Schema,
    store: Arc<Mutex<HashMap<String, Attributes>>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    invisible_reads: AtomicUsize,
}

impl MemoryResource {
    pub fn new() -> Self {
        let schema = Schema::new("In-memory test resource")
            .field(Field::string("name").required().force_new())
            .field(Field::string("remark").optional())
            .field(Field::int("size").optional().default_value(json!(10)))
            .field(Field::string("token").optional().sensitive())
            .field(Field::string("arn").computed());

        Self {
            schema,
            store: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicUsize::new(1),
            calls: AtomicUsize::new(0),
            invisible_reads: AtomicUsize::new(0),
        }
    }

    /// Reads return absent this many times after a create
    pub fn with_invisible_reads(self, count: usize) -> Self {
        self.invisible_reads.store(count, Ordering::SeqCst);
        self
    }

    pub fn remote_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Remove an entity behind the engine's back
    pub fn forget(&self, id: &str) {
        self.store.lock().unwrap().remove(id);
    }

    pub fn store(&self) -> Arc<Mutex<HashMap<String, Attributes>>> {
        self.store.clone()
    }
}

#[async_trait]
impl Resource for MemoryResource {
    fn type_name(&self) -> &'static str {
        MEMORY_TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn id_segments(&self) -> usize {
        2
    }

    async fn create(&self, _ctx: &Context, config: &Attributes) -> Result<ResourceId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let name = config.get_str("name").unwrap_or_default().to_string();
        let id = ResourceId::compose([name, format!("mem-{}", n)])?;

        let mut remote = config.clone();
        remote.remove("token");
        remote.insert("arn".into(), json!(format!("arn:mem:{}", n)));
        self.store.lock().unwrap().insert(id.to_string(), remote);
        Ok(id)
    }

    async fn read(&self, _ctx: &Context, id: &ResourceId) -> Result<Option<Attributes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hidden = self
            .invisible_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        Ok(self.store.lock().unwrap().get(&id.to_string()).cloned())
    }

    async fn update(
        &self,
        _ctx: &Context,
        id: &ResourceId,
        config: &Attributes,
        diff: &Diff,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store.lock().unwrap();
        let remote = store
            .get_mut(&id.to_string())
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))?;
        for field in &diff.in_place {
            if field == "token" {
                continue;
            }
            match config.get(field) {
                Some(value) => remote.insert(field.clone(), value.clone()),
                None => remote.remove(field),
            };
        }
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, id: &ResourceId) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.store
            .lock()
            .unwrap()
            .remove(&id.to_string())
            .map(|_| ())
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))
    }
}

/// Data source listing the names stored in a [`MemoryResource`]
pub struct MemoryNames {
    schema: Schema,
    store: Arc<Mutex<HashMap<String, Attributes>>>,
}

impl MemoryNames {
    pub fn new(resource: &MemoryResource) -> Self {
        Self {
            schema: Schema::new("Names of in-memory things")
                .field(Field::string("prefix").optional())
                .field(Field::string_list("names").computed()),
            store: resource.store(),
        }
    }
}

#[async_trait]
impl DataSource for MemoryNames {
    fn type_name(&self) -> &'static str {
        "memory_names"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, _ctx: &Context, args: &Attributes) -> Result<DataResult> {
        let prefix = args.get_str("prefix").unwrap_or_default();
        let mut names: Vec<String> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter_map(|a| a.get_str("name").map(str::to_string))
            .filter(|n| n.starts_with(prefix))
            .collect();
        names.sort();

        let mut attributes = args.clone();
        attributes.insert("names".into(), json!(names));
        Ok(DataResult {
            id: ids_hash(&names),
            attributes,
        })
    }
}

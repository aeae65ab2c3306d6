use serde_json::Value;

use super::model::Resource;
use crate::modules::http::{ApiError, RequestPipeline};

/// CRUD over one backend collection. Records stay untyped JSON; the
/// screens that render them own their shape.
pub struct ResourceClient<'a> {
    pipeline: &'a RequestPipeline,
    resource: Resource,
}

impl<'a> ResourceClient<'a> {
    pub fn new(pipeline: &'a RequestPipeline, resource: Resource) -> Self {
        Self { pipeline, resource }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub async fn list_all(&self) -> Result<Vec<Value>, ApiError> {
        let rows: Option<Vec<Value>> = self
            .pipeline
            .get(&format!("{}/todos", self.resource.base_path()))
            .await?;
        Ok(rows.unwrap_or_default())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Value, ApiError> {
        self.pipeline.get(&self.item_path(id)?).await
    }

    /// Create a record; any `id` field in `record` is dropped first
    pub async fn create(&self, record: &Value) -> Result<Value, ApiError> {
        let mut record = record.clone();
        if let Some(fields) = record.as_object_mut() {
            fields.remove("id");
        }
        self.pipeline.post(&self.resource.base_path(), &record).await
    }

    pub async fn update(&self, id: &str, record: &Value) -> Result<Value, ApiError> {
        self.pipeline.put(&self.item_path(id)?, record).await
    }

    /// Activate or deactivate a record (`PATCH …/{id}/estado?activo=…`)
    pub async fn set_active(&self, id: &str, active: bool) -> Result<Value, ApiError> {
        let path = format!("{}/estado", self.item_path(id)?);
        self.pipeline
            .patch_query(&path, &[("activo", active.to_string())])
            .await
    }

    fn item_path(&self, id: &str) -> Result<String, ApiError> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(ApiError::invalid_input(format!("Invalid {} id '{}'", self.resource, id)));
        }
        Ok(format!("{}/{}", self.resource.base_path(), id))
    }
}

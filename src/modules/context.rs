use log::info;
use std::sync::Arc;

use crate::modules::auth::session::SessionManager;
use crate::modules::auth::store::{CredentialStore, FileStore, KeyValueStore, MemoryStore};
use crate::modules::config::{ClientConfig, StorageBackend};
use crate::modules::http::{ApiError, ReqwestTransport, RequestPipeline, Transport};
use crate::modules::notifications::Notifier;
use crate::modules::resources::{Resource, ResourceClient};
use crate::modules::routing::{Location, RouteGuard, Router};
use crate::modules::security::KeyringStore;

/// Application context built once at startup and kept for the life of the
/// process. Every component shares the same session manager.
pub struct UrbanClient {
    session: Arc<SessionManager>,
    pipeline: RequestPipeline,
    guard: RouteGuard,
    router: Router,
}

impl UrbanClient {
    /// Build the client with the real HTTP transport and the configured storage backend
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.request_timeout())?);
        Ok(Self::with_parts(config, transport, storage_backend(config)))
    }

    pub fn with_parts(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        backend: Box<dyn KeyValueStore>,
    ) -> Self {
        let location = Arc::new(Location::new());
        let credentials = CredentialStore::new(backend, config.storage_keys.clone());
        let session = Arc::new(SessionManager::new(
            config.api_base_url.clone(),
            credentials,
            Arc::clone(&transport),
            Notifier::new(config.notification_ttl()),
            location.clone(),
        ));
        let guard = RouteGuard::new(Arc::clone(&session));
        let router = Router::new(guard.clone(), location);
        let pipeline = RequestPipeline::new(Arc::clone(&session), transport);

        info!("Client ready for {}", config.api_base_url);
        Self {
            session,
            pipeline,
            guard,
            router,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn resource(&self, resource: Resource) -> ResourceClient<'_> {
        ResourceClient::new(&self.pipeline, resource)
    }
}

fn storage_backend(config: &ClientConfig) -> Box<dyn KeyValueStore> {
    match config.storage {
        StorageBackend::Keyring => Box::new(KeyringStore::new(config.keyring_service.clone())),
        StorageBackend::File => Box::new(FileStore::new(config.storage_path.clone())),
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    }
}

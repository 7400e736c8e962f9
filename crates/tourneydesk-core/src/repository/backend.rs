use async_trait::async_trait;
use tracing::debug;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::cache::{QueryCache, QueryKey};
use crate::models::Entity;

/// Where a repository persists its changes.
#[async_trait]
pub trait Backend<T: Entity>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, ApiError>;

    /// Persist a new item and return the stored version
    async fn create(&self, item: &T) -> Result<T, ApiError>;

    /// Persist `patch`; `merged` is the tentatively updated item
    async fn update(&self, id: &T::Id, patch: &T::Patch, merged: &T) -> Result<T, ApiError>;

    async fn delete(&self, id: &T::Id) -> Result<(), ApiError>;
}

/// In-memory backend: `list` returns the seed data and every mutation is
/// confirmed unchanged.
#[derive(Debug, Clone)]
pub struct LocalBackend<T> {
    seed: Vec<T>,
}

impl<T> Default for LocalBackend<T> {
    fn default() -> Self {
        Self { seed: Vec::new() }
    }
}

impl<T> LocalBackend<T> {
    pub fn new(seed: Vec<T>) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl<T: Entity> Backend<T> for LocalBackend<T> {
    async fn list(&self) -> Result<Vec<T>, ApiError> {
        Ok(self.seed.clone())
    }

    async fn create(&self, item: &T) -> Result<T, ApiError> {
        Ok(item.clone())
    }

    async fn update(&self, _id: &T::Id, _patch: &T::Patch, merged: &T) -> Result<T, ApiError> {
        Ok(merged.clone())
    }

    async fn delete(&self, _id: &T::Id) -> Result<(), ApiError> {
        Ok(())
    }
}

/// The REST calls a [`RemoteBackend`] needs, per entity collection.
#[async_trait]
pub trait EntityTransport: Send + Sync {
    async fn list_all<T: Entity>(&self) -> ApiResult<Vec<T>>;
    async fn post<T: Entity>(&self, item: &T) -> ApiResult<T>;
    async fn patch<T: Entity>(&self, id: &T::Id, patch: &T::Patch) -> ApiResult<T>;
    async fn remove<T: Entity>(&self, id: &T::Id) -> ApiResult<()>;
}

#[async_trait]
impl EntityTransport for ApiClient {
    async fn list_all<T: Entity>(&self) -> ApiResult<Vec<T>> {
        self.list::<T>().await
    }

    async fn post<T: Entity>(&self, item: &T) -> ApiResult<T> {
        self.create(item).await
    }

    async fn patch<T: Entity>(&self, id: &T::Id, patch: &T::Patch) -> ApiResult<T> {
        self.update::<T>(id, patch).await
    }

    async fn remove<T: Entity>(&self, id: &T::Id) -> ApiResult<()> {
        self.delete::<T>(id).await
    }
}

/// Backend that talks to the REST API.
///
/// Lists are read through the query cache. A successful mutation invalidates
/// every cache resource depending on the entity kind; a failed one
/// invalidates nothing.
#[derive(Clone)]
pub struct RemoteBackend<C = ApiClient> {
    transport: C,
    cache: QueryCache,
}

impl<C: EntityTransport> RemoteBackend<C> {
    pub fn new(transport: C, cache: QueryCache) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn transport(&self) -> &C {
        &self.transport
    }
}

#[async_trait]
impl<T: Entity, C: EntityTransport> Backend<T> for RemoteBackend<C> {
    async fn list(&self) -> Result<Vec<T>, ApiError> {
        let key = QueryKey::all(T::KIND);
        self.cache
            .get(&key, self.cache.options(), || self.transport.list_all::<T>())
            .await
    }

    async fn create(&self, item: &T) -> Result<T, ApiError> {
        let created = self.transport.post(item).await?;
        self.cache.invalidate_entity(T::KIND).await;
        Ok(created)
    }

    async fn update(&self, id: &T::Id, patch: &T::Patch, _merged: &T) -> Result<T, ApiError> {
        let updated = self.transport.patch::<T>(id, patch).await?;
        self.cache.invalidate_entity(T::KIND).await;
        Ok(updated)
    }

    async fn delete(&self, id: &T::Id) -> Result<(), ApiError> {
        self.transport.remove::<T>(id).await?;
        let invalidated = self.cache.invalidate_entity(T::KIND).await;
        debug!(kind = %T::KIND, id = %id, invalidated, "Deleted remotely");
        Ok(())
    }
}

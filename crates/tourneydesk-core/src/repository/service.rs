use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::backend::Backend;
use super::error::RepositoryError;
use super::notify::Notifier;
use crate::models::Entity;

/// In-memory collection of one entity type backed by a [`Backend`].
///
/// Locks are never held across a backend call; the tentative state is
/// visible to readers until the backend confirms or the change is rolled
/// back.
pub struct Repository<T: Entity, B: Backend<T>> {
    items: Arc<RwLock<Vec<T>>>,
    backend: B,
    notifier: Notifier,
}

impl<T: Entity, B: Backend<T>> Repository<T, B> {
    pub fn new(backend: B, notifier: Notifier) -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            backend,
            notifier,
        }
    }

    pub fn with_items(backend: B, notifier: Notifier, items: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            backend,
            notifier,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn get_all(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn get_by_id(&self, id: &T::Id) -> Option<T> {
        self.items.read().await.iter().find(|i| i.id() == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Replace the collection with the backend's list
    pub async fn sync(&self) -> Result<usize, RepositoryError> {
        match self.backend.list().await {
            Ok(items) => {
                let count = items.len();
                *self.items.write().await = items;
                debug!(kind = %T::KIND, count, "Synced collection");
                Ok(count)
            }
            Err(e) => {
                warn!(kind = %T::KIND, error = %e, "Failed to load collection");
                self.notifier
                    .error(format!("Failed to load {}: {}", T::KIND.resource(), e));
                Err(e.into())
            }
        }
    }

    /// Validate, reject conflicts, prepend tentatively, then confirm or roll back.
    pub async fn create(&self, item: T) -> Result<T, RepositoryError> {
        if let Err(errors) = item.validate() {
            self.notifier.error(format!("Invalid {}: {}", T::KIND, errors));
            return Err(RepositoryError::Validation {
                kind: T::KIND,
                errors,
            });
        }

        {
            let mut items = self.items.write().await;
            let same_id = !item.is_pending() && items.iter().any(|other| other.id() == item.id());
            let conflict = if same_id {
                Some(format!("id {} is taken", item.id()))
            } else {
                items
                    .iter()
                    .find(|other| item.conflicts_with(other))
                    .map(|existing| format!("conflicts with {}", existing.id()))
            };
            if let Some(detail) = conflict {
                self.notifier
                    .error(format!("{} already exists ({})", T::KIND, detail));
                return Err(RepositoryError::Duplicate {
                    kind: T::KIND,
                    detail,
                });
            }
            items.insert(0, item.clone());
        }

        match self.backend.create(&item).await {
            Ok(confirmed) => {
                let mut items = self.items.write().await;
                if let Some(slot) = items.iter_mut().find(|i| i.id() == item.id()) {
                    *slot = confirmed.clone();
                }
                drop(items);
                info!(kind = %T::KIND, id = %confirmed.id(), "Created");
                self.notifier.success(format!("{} created", T::KIND));
                Ok(confirmed)
            }
            Err(e) => {
                let mut items = self.items.write().await;
                if let Some(pos) = items.iter().position(|i| i.id() == item.id()) {
                    items.remove(pos);
                }
                drop(items);
                warn!(kind = %T::KIND, error = %e, "Create failed, rolled back");
                self.notifier
                    .error(format!("Failed to create {}: {}", T::KIND, e));
                Err(e.into())
            }
        }
    }

    /// Merge `patch` into the item with `id`.
    ///
    /// A missing id leaves the collection unchanged and reports `NotFound`.
    pub async fn update(&self, id: &T::Id, patch: T::Patch) -> Result<T, RepositoryError> {
        let (previous, merged) = {
            let mut items = self.items.write().await;
            let Some(slot) = items.iter_mut().find(|i| i.id() == id) else {
                return Err(self.not_found(id));
            };
            let previous = slot.clone();
            let mut merged = previous.clone();
            merged.apply(&patch);
            if let Err(errors) = merged.validate() {
                self.notifier.error(format!("Invalid {}: {}", T::KIND, errors));
                return Err(RepositoryError::Validation {
                    kind: T::KIND,
                    errors,
                });
            }
            *slot = merged.clone();
            (previous, merged)
        };

        match self.backend.update(id, &patch, &merged).await {
            Ok(confirmed) => {
                self.replace(id, confirmed.clone()).await;
                self.notifier.success(format!("{} updated", T::KIND));
                Ok(confirmed)
            }
            Err(e) => {
                self.replace(id, previous).await;
                warn!(kind = %T::KIND, id = %id, error = %e, "Update failed, rolled back");
                self.notifier
                    .error(format!("Failed to update {}: {}", T::KIND, e));
                Err(e.into())
            }
        }
    }

    /// Remove the item with `id`; on backend failure it is restored in place.
    pub async fn remove(&self, id: &T::Id) -> Result<T, RepositoryError> {
        let (position, removed) = {
            let mut items = self.items.write().await;
            let Some(position) = items.iter().position(|i| i.id() == id) else {
                return Err(self.not_found(id));
            };
            (position, items.remove(position))
        };

        match self.backend.delete(id).await {
            Ok(()) => {
                info!(kind = %T::KIND, id = %id, "Removed");
                self.notifier.success(format!("{} removed", T::KIND));
                Ok(removed)
            }
            Err(e) => {
                let mut items = self.items.write().await;
                let position = position.min(items.len());
                items.insert(position, removed);
                drop(items);
                warn!(kind = %T::KIND, id = %id, error = %e, "Remove failed, rolled back");
                self.notifier
                    .error(format!("Failed to remove {}: {}", T::KIND, e));
                Err(e.into())
            }
        }
    }

    async fn replace(&self, id: &T::Id, item: T) {
        let mut items = self.items.write().await;
        if let Some(slot) = items.iter_mut().find(|i| i.id() == id) {
            *slot = item;
        }
    }

    fn not_found(&self, id: &T::Id) -> RepositoryError {
        self.notifier
            .error(format!("{} {} not found", T::KIND, id));
        RepositoryError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }
}

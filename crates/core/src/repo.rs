//! Injected repository seam + in-memory fake.
//!
//! Workflow engines never hold a shared storage handle directly; they are
//! constructed over this abstraction so tests substitute the in-memory fake.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};

/// Keyed store abstraction for domain entities.
///
/// `insert` and `update` distinguish create from modify on purpose: a
/// duplicate insert or an update of a missing row indicates a defect in the
/// calling guard logic and surfaces as `Storage`, never as a business error.
pub trait Repository<T: Entity>: Send + Sync {
    fn get(&self, id: &T::Id) -> Option<T>;
    fn insert(&self, value: T) -> DomainResult<()>;
    fn update(&self, value: T) -> DomainResult<()>;
    fn list(&self) -> Vec<T>;
}

impl<T, R> Repository<T> for Arc<R>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    fn get(&self, id: &T::Id) -> Option<T> {
        (**self).get(id)
    }

    fn insert(&self, value: T) -> DomainResult<()> {
        (**self).insert(value)
    }

    fn update(&self, value: T) -> DomainResult<()> {
        (**self).update(value)
    }

    fn list(&self) -> Vec<T> {
        (**self).list()
    }
}

/// In-memory repository for tests/dev and the default engine wiring.
#[derive(Debug)]
pub struct InMemoryRepository<T: Entity> {
    inner: RwLock<HashMap<T::Id, T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Entity + Clone + Send + Sync + 'static,
    T::Id: Send + Sync,
{
    fn get(&self, id: &T::Id) -> Option<T> {
        let map = self.inner.read().ok()?;
        map.get(id).cloned()
    }

    fn insert(&self, value: T) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("repository lock poisoned"))?;
        let id = value.id().clone();
        if map.contains_key(&id) {
            return Err(DomainError::storage(format!("duplicate id: {id:?}")));
        }
        map.insert(id, value);
        Ok(())
    }

    fn update(&self, value: T) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("repository lock poisoned"))?;
        let id = value.id().clone();
        if !map.contains_key(&id) {
            return Err(DomainError::storage(format!("update of missing id: {id:?}")));
        }
        map.insert(id, value);
        Ok(())
    }

    fn list(&self) -> Vec<T> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

/*!
 * Shape Cache
 * Per-type memoization of type shapes
 */

use super::shape::TypeShape;
use ahash::RandomState;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Concurrent caches of owner and payload shapes
///
/// Kept apart because one type may describe itself differently as an owner
/// and as a payload.
#[derive(Debug, Default)]
pub struct ShapeCache {
    owners: DashMap<TypeId, TypeShape, RandomState>,
    payloads: DashMap<TypeId, Arc<[TypeShape]>, RandomState>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self {
            owners: DashMap::with_hasher(RandomState::new()),
            payloads: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Cached owner shape for `T`, computing it with `describe` on first use
    pub fn owner_shape<T: ?Sized + 'static>(&self, describe: impl FnOnce() -> TypeShape) -> TypeShape {
        let key = TypeId::of::<T>();
        if let Some(shape) = self.owners.get(&key) {
            return *shape;
        }
        *self.owners.entry(key).or_insert_with(describe)
    }

    /// Cached payload shapes for `T`, computing them with `describe` on first use
    pub fn payload_shapes<T: ?Sized + 'static>(
        &self,
        describe: impl FnOnce() -> Vec<TypeShape>,
    ) -> Arc<[TypeShape]> {
        let key = TypeId::of::<T>();
        if let Some(shapes) = self.payloads.get(&key) {
            return Arc::clone(&shapes);
        }
        let shapes = self
            .payloads
            .entry(key)
            .or_insert_with(|| Arc::from(describe()));
        Arc::clone(&shapes)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.owners.len() + self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

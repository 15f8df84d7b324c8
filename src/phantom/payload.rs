/*!
 * Payloads
 * Data handed to a cleanup action, with its identity and declared shape
 */

use crate::core::types::Identity;
use crate::heuristic::TypeShape;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicU32, AtomicU64, AtomicUsize};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Data passed to a cleanup action
///
/// The payload must not reference the owner; if it did, the owner could never
/// be dropped and the cleanup would never run.
///
/// - `shape` describes how the type is declared, for the leak heuristic.
///   Override it for types nested in an owner type:
///   `TypeShape::nested_in::<Self, Owner>(Nesting::StaticNested)`.
/// - `shapes` lists every shape the heuristic checks. Wrappers and
///   collections report their elements; tuples report each component.
/// - `identity` is the address identity of shared payloads. Owned values have
///   none; `Arc<T>` reports its pointee. Cleanups with the same identity never
///   run concurrently, and a payload whose identity is the owner is rejected.
pub trait Payload: Send + 'static {
    fn shape() -> TypeShape
    where
        Self: Sized,
    {
        TypeShape::top_level::<Self>()
    }

    fn shapes() -> Vec<TypeShape>
    where
        Self: Sized,
    {
        vec![Self::shape()]
    }

    fn identity(&self) -> Option<Identity> {
        None
    }
}

macro_rules! delegate_shapes {
    ($t:ident) => {
        fn shape() -> TypeShape {
            $t::shape()
        }

        fn shapes() -> Vec<TypeShape> {
            $t::shapes()
        }
    };
}

macro_rules! impl_owned_payload {
    ($($t:ty),* $(,)?) => {
        $(impl Payload for $t {})*
    };
}

// Plain owned values carry no identity and no back-reference
impl_owned_payload!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, &'static str, PathBuf, Duration, Instant, SystemTime, std::fs::File,
    AtomicBool, AtomicI32, AtomicI64, AtomicU32, AtomicU64, AtomicUsize,
);

impl<T: Payload + Sync> Payload for Arc<T> {
    delegate_shapes!(T);

    fn identity(&self) -> Option<Identity> {
        Some(Arc::as_ptr(self) as *const () as Identity)
    }
}

impl<T: Payload> Payload for Box<T> {
    delegate_shapes!(T);

    fn identity(&self) -> Option<Identity> {
        (**self).identity()
    }
}

impl<T: Payload> Payload for Option<T> {
    delegate_shapes!(T);

    fn identity(&self) -> Option<Identity> {
        self.as_ref().and_then(Payload::identity)
    }
}

impl<T: Payload> Payload for parking_lot::Mutex<T> {
    delegate_shapes!(T);
}

impl<T: Payload + Sync> Payload for parking_lot::RwLock<T> {
    delegate_shapes!(T);
}

impl<T: Payload> Payload for Vec<T> {
    delegate_shapes!(T);
}

impl<A: Payload, B: Payload> Payload for (A, B) {
    fn shapes() -> Vec<TypeShape> {
        let mut shapes = A::shapes();
        shapes.extend(B::shapes());
        shapes
    }
}

impl<A: Payload, B: Payload, C: Payload> Payload for (A, B, C) {
    fn shapes() -> Vec<TypeShape> {
        let mut shapes = A::shapes();
        shapes.extend(B::shapes());
        shapes.extend(C::shapes());
        shapes
    }
}

// Closure environments are compiler-generated and may capture anything
impl Payload for Box<dyn Fn() + Send + Sync> {
    fn shape() -> TypeShape {
        TypeShape::synthetic::<Self>()
    }
}

impl Payload for Box<dyn FnMut() + Send> {
    fn shape() -> TypeShape {
        TypeShape::synthetic::<Self>()
    }
}

impl Payload for Box<dyn FnOnce() + Send> {
    fn shape() -> TypeShape {
        TypeShape::synthetic::<Self>()
    }
}

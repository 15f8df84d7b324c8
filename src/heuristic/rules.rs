/*!
 * Leak Rules
 * Pluggable predicates deciding whether a payload may capture its owner
 */

use super::shape::{Nesting, TypeShape};
use crate::core::errors::LeakReason;

/// Static check that a payload type does not structurally reference the owner
///
/// Only the declared shape is inspected; indirect reference chains are
/// invisible to any implementation of this trait.
pub trait LeakHeuristic: Send + Sync {
    /// Reason the payload is suspect, or `None` if it looks safe
    fn classify(&self, owner: &TypeShape, payload: &TypeShape) -> Option<LeakReason>;

    fn is_suspect(&self, owner: &TypeShape, payload: &TypeShape) -> bool {
        self.classify(owner, payload).is_some()
    }
}

/// Default heuristic
///
/// Rejects anonymous and inner types declared inside the owner's type, and
/// every synthetic type regardless of where it was declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralHeuristic;

impl LeakHeuristic for StructuralHeuristic {
    fn classify(&self, owner: &TypeShape, payload: &TypeShape) -> Option<LeakReason> {
        let in_owner = payload.is_enclosed_by(owner);
        match payload.nesting() {
            Nesting::Anonymous if in_owner => Some(LeakReason::AnonymousInOwner),
            Nesting::Inner if in_owner => Some(LeakReason::InnerOfOwner),
            Nesting::Synthetic => Some(LeakReason::Synthetic),
            _ => None,
        }
    }
}

/// Heuristic that accepts every payload
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl LeakHeuristic for AcceptAll {
    fn classify(&self, _owner: &TypeShape, _payload: &TypeShape) -> Option<LeakReason> {
        None
    }
}

/*!
 * Leak Heuristic
 *
 * Best-effort static detection of payloads that would keep their owner
 * alive. Works on declared type shapes only:
 *
 * - **Anonymous** types inside the owner's type are rejected
 * - **Inner** (non-static nested) types of the owner's type are rejected
 * - **Synthetic** types (boxed closures) are always rejected
 *
 * Indirect reference chains are not detected.
 */

mod cache;
mod rules;
mod shape;

pub use cache::ShapeCache;
pub use rules::{AcceptAll, LeakHeuristic, StructuralHeuristic};
pub use shape::{Nesting, TypeShape};

/*!
 * Type Shapes
 * Lightweight structural descriptors of payload and owner types
 */

use std::any::{type_name, TypeId};

/// How a type is declared relative to its enclosing type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nesting {
    /// Free-standing type
    TopLevel,
    /// Declared inside another type, carries no reference to an instance of it
    StaticNested,
    /// Declared inside another type and holds the enclosing instance
    Inner,
    /// Unnamed type defined inline inside another type
    Anonymous,
    /// Generated by the compiler, e.g. a closure environment
    Synthetic,
}

/// Structural descriptor of one type
///
/// Computed once per type and cached; the leak heuristic inspects only this
/// declared shape, never the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeShape {
    type_id: TypeId,
    name: &'static str,
    enclosing: Option<TypeId>,
    nesting: Nesting,
}

impl TypeShape {
    /// Shape of a free-standing type
    pub fn top_level<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            enclosing: None,
            nesting: Nesting::TopLevel,
        }
    }

    /// Shape of `T` declared inside `Outer`
    ///
    /// `Nesting::TopLevel` and `Nesting::Synthetic` ignore the enclosing type.
    pub fn nested_in<T: ?Sized + 'static, Outer: ?Sized + 'static>(nesting: Nesting) -> Self {
        let enclosing = match nesting {
            Nesting::TopLevel | Nesting::Synthetic => None,
            _ => Some(TypeId::of::<Outer>()),
        };
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            enclosing,
            nesting,
        }
    }

    /// Shape of a compiler-generated type
    pub fn synthetic<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            enclosing: None,
            nesting: Nesting::Synthetic,
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn enclosing(&self) -> Option<TypeId> {
        self.enclosing
    }

    #[inline]
    pub fn nesting(&self) -> Nesting {
        self.nesting
    }

    /// Whether this type is declared inside `other`
    #[inline]
    pub fn is_enclosed_by(&self, other: &TypeShape) -> bool {
        self.enclosing == Some(other.type_id)
    }
}

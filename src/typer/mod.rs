/// Mo semantic analyzer and typer.
///
/// Two-phase analysis over a parsed module:
///   Phase 1: index every top-level type definition into the type table,
///             so intra-module references resolve regardless of
///             declaration order.
///   Phase 2: type each definition's members in declaration order,
///             producing a typed tree in which every expression carries a
///             resolved type and every member access is bound to a concrete
///             declaration.
///
/// The typer is fail-fast: the first error aborts the compilation unit and
/// is reported with the position of the offending node.
use thiserror::Error;

use crate::ast::Module;
use crate::pos::Pos;
use crate::tast::TypedModule;
use crate::types::{fmt_tys, Ty, TypePath};

mod expr;
mod member;
mod scope;
mod table;

#[cfg(test)]
mod tests;

pub use scope::ScopeStack;
pub use table::TypeTable;

#[derive(Debug, Clone, Error)]
pub enum TypeErrorKind {
    #[error("Unknown identifier '{0}'")]
    UnresolvedIdent(String),
    #[error("Unknown type path '{0}'")]
    UnresolvedPath(TypePath),
    #[error("'this' used outside of a class")]
    UnresolvedThis,
    #[error("'super' used in a class with no parent")]
    UnresolvedSuper,
    #[error("Type '{0}' has no member '{1}'")]
    UnresolvedField(Ty, String),
    #[error("Cannot access a member of type '{0}'")]
    CannotField(Ty),
    #[error("Field '{0}' has neither a type annotation nor an initializer")]
    UnresolvedFieldType(String),
    #[error("Operator '{0}' is not defined for '{1}' and '{2}'")]
    CannotBinOp(String, Ty, Ty),
    #[error("Cannot assign to a constant")]
    CannotAssign,
    #[error("Invalid assignment target")]
    InvalidLhs,
    #[error("Type '{0}' is not callable")]
    CannotCall(Ty),
    #[error("Indexing requires a tuple receiver and a constant index in range")]
    CannotIndex,
    #[error("Cannot cast to '{0}'")]
    CannotCastTo(Ty),
    #[error("Expected '{0}', got '{1}'")]
    Expected(Ty, Ty),
    #[error("No constructor on '{}' matches ({})", .0, fmt_tys(.1))]
    NoMatchingConstr(TypePath, Vec<Ty>),
    #[error("Arguments ({}) do not match a callee of type '{}' expecting ({})", fmt_tys(.2), .0, fmt_tys(.1))]
    FunctionArgsMismatch(Ty, Vec<Ty>, Vec<Ty>),
    #[error("Function body does not produce the declared return type")]
    NoReturn,
    #[error("A binding cannot have type 'void'")]
    VoidVar,
    #[error("Duplicate type definition '{0}'")]
    DuplicateType(TypePath),
}

/// A typing error: a kind plus the position of the offending node.
#[derive(Debug, Clone, Error)]
#[error("{pos}: {kind}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub pos: Pos,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, pos: Pos) -> Self {
        TypeError { kind, pos }
    }
}

/// All mutable state of the typer. One instance types one compilation
/// unit; it is passed explicitly, never global.
pub struct TypeContext {
    pub table: TypeTable,
    pub scopes: ScopeStack,
    /// Path of the type whose members are being typed.
    pub this_path: Option<TypePath>,
    /// True while typing a member carrying the `static` modifier.
    pub in_static: bool,
    /// True within a constructor body.
    pub in_constructor: bool,
    /// Set when a `return` is typed; consulted by the body check.
    pub has_returned: bool,
}

impl TypeContext {
    pub fn new() -> Self {
        TypeContext {
            table: TypeTable::new(),
            scopes: ScopeStack::new(),
            this_path: None,
            in_static: false,
            in_constructor: false,
            has_returned: false,
        }
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        TypeContext::new()
    }
}

/// Type a whole module. Returns the typed tree together with the context,
/// whose populated type table the consumer needs alongside the tree.
pub fn type_module(module: &Module) -> Result<(TypedModule, TypeContext), TypeError> {
    let mut cx = TypeContext::new();
    let typed = cx.type_module(module)?;
    Ok((typed, cx))
}

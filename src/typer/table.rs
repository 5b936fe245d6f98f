use std::collections::{HashMap, HashSet};

use super::TypeErrorKind;
use crate::ast::{TypeDef, TypeDefKind};
use crate::types::{Ty, TypePath};

/// The type table: fully-qualified path → untyped declaration.
///
/// Populated once, before any member body is typed; read-only afterwards.
#[derive(Debug)]
pub struct TypeTable {
    defs: HashMap<TypePath, TypeDef>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable {
            defs: HashMap::new(),
        }
    }

    /// Insert a top-level declaration. A path may only be declared once.
    pub fn index(&mut self, def: &TypeDef) -> Result<(), TypeErrorKind> {
        if self.defs.contains_key(&def.path) {
            return Err(TypeErrorKind::DuplicateType(def.path.clone()));
        }
        self.defs.insert(def.path.clone(), def.clone());
        Ok(())
    }

    pub fn get(&self, path: &TypePath) -> Result<&TypeDef, TypeErrorKind> {
        self.defs
            .get(path)
            .ok_or_else(|| TypeErrorKind::UnresolvedPath(path.clone()))
    }

    pub fn contains(&self, path: &TypePath) -> bool {
        self.defs.contains_key(path)
    }

    /// Cast compatibility: any two numeric primitives, or an instance type
    /// to one of its ancestors along the `extends` chain (or anything an
    /// ancestor declares in `implements`). The visited set bounds the walk
    /// on a cyclic `extends` chain, in which case the cast is rejected.
    pub fn can_cast(&self, from: &Ty, to: &Ty) -> bool {
        if from.is_numeric() && to.is_numeric() {
            return true;
        }
        let (Ty::Inst(from_path), Ty::Inst(to_path)) = (from, to) else {
            return false;
        };

        let mut visited = HashSet::new();
        let mut current = from_path.clone();
        loop {
            if !visited.insert(current.clone()) {
                return false;
            }
            let Ok(def) = self.get(&current) else {
                return false;
            };
            let TypeDefKind::Class {
                extends,
                implements,
            } = &def.kind
            else {
                return false;
            };
            if implements.iter().any(|p| p == to_path) {
                return true;
            }
            match extends {
                Some(parent) if parent == to_path => return true,
                Some(parent) => current = parent.clone(),
                None => return false,
            }
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}

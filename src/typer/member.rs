use super::expr::{func_conv, param_tys};
use super::{TypeContext, TypeError, TypeErrorKind};
use crate::ast::{MemberDef, MemberKind, MemberMod, Module, TypeDef, Variability};
use crate::tast::{TMemberDef, TMemberKind, TTypeDef, TypedModule};
use crate::types::{CallConv, Ty};

impl TypeContext {
    pub fn type_module(&mut self, module: &Module) -> Result<TypedModule, TypeError> {
        // Phase 1: index every definition so intra-module references
        // resolve regardless of declaration order.
        for def in &module.defs {
            self.table
                .index(def)
                .map_err(|k| TypeError::new(k, def.pos.clone()))?;
        }

        // Phase 2: type each definition in module order.
        let mut defs = Vec::new();
        for def in &module.defs {
            defs.push(self.type_def(def)?);
        }

        Ok(TypedModule {
            package: module.package.clone(),
            imports: module.imports.clone(),
            defs,
        })
    }

    fn type_def(&mut self, def: &TypeDef) -> Result<TTypeDef, TypeError> {
        self.this_path = Some(def.path.clone());
        self.table
            .get(&def.path)
            .map_err(|k| TypeError::new(k, def.pos.clone()))?;

        let mut members = Vec::new();
        for m in &def.members {
            members.push(self.type_member(m)?);
        }

        Ok(TTypeDef {
            path: def.path.clone(),
            kind: def.kind.clone(),
            mods: def.mods.clone(),
            members,
            pos: def.pos.clone(),
        })
    }

    fn type_member(&mut self, m: &MemberDef) -> Result<TMemberDef, TypeError> {
        self.in_static = m.mods.contains(&MemberMod::Static);
        self.in_constructor = false;
        self.has_returned = false;

        let (kind, ty) = match &m.kind {
            MemberKind::Var {
                variability,
                ty: ann,
                init,
            } => {
                let (field_ty, tinit) = match (ann, init) {
                    (Some(t), None) => (t.clone(), None),
                    (ann, Some(init)) => {
                        let tinit = self.type_expr(init)?;
                        if let Some(t) = ann {
                            if *t != tinit.ty {
                                return Err(TypeError::new(
                                    TypeErrorKind::Expected(t.clone(), tinit.ty.clone()),
                                    init.pos.clone(),
                                ));
                            }
                        }
                        (tinit.ty.clone(), Some(tinit))
                    }
                    (None, None) => {
                        return Err(TypeError::new(
                            TypeErrorKind::UnresolvedFieldType(m.name.clone()),
                            m.pos.clone(),
                        ))
                    }
                };
                if field_ty.is_void() {
                    return Err(TypeError::new(TypeErrorKind::VoidVar, m.pos.clone()));
                }
                (
                    TMemberKind::Var {
                        variability: *variability,
                        ty: field_ty.clone(),
                        init: tinit,
                    },
                    field_ty,
                )
            }
            MemberKind::Func { params, ret, body } => {
                let tbody = match body {
                    Some(body) => {
                        self.scopes.push_scope();
                        for p in params {
                            self.scopes
                                .define(p.name.clone(), Variability::Constant, p.ty.clone());
                        }
                        let tbody = self.type_expr(body);
                        self.scopes.pop_scope();
                        let tbody = tbody?;
                        // A body whose type is not the return type must
                        // return explicitly somewhere
                        if tbody.ty != *ret && !self.has_returned {
                            return Err(TypeError::new(TypeErrorKind::NoReturn, m.pos.clone()));
                        }
                        Some(tbody)
                    }
                    None => None,
                };
                let fty = Ty::Func(param_tys(params), Box::new(ret.clone()), func_conv(m));
                (
                    TMemberKind::Func {
                        params: params.clone(),
                        ret: ret.clone(),
                        body: tbody,
                    },
                    fty,
                )
            }
            MemberKind::Constr { params, body } => {
                self.scopes.push_scope();
                self.in_constructor = true;
                for p in params {
                    self.scopes
                        .define(p.name.clone(), Variability::Constant, p.ty.clone());
                }
                let tbody = self.type_expr(body);
                self.scopes.pop_scope();
                let tbody = tbody?;
                let fty = Ty::Func(param_tys(params), Box::new(Ty::VOID), CallConv::Normal);
                (
                    TMemberKind::Constr {
                        params: params.clone(),
                        body: tbody,
                    },
                    fty,
                )
            }
        };

        Ok(TMemberDef {
            name: m.name.clone(),
            kind,
            ty,
            mods: m.mods.clone(),
            atts: m.atts.clone(),
            pos: m.pos.clone(),
        })
    }
}

use std::collections::HashSet;

use super::{TypeContext, TypeError, TypeErrorKind};
use crate::ast::{BinOp, Const, Expr, ExprDef, MemberDef, MemberKind, Param, TypeDefKind, UnOp, Variability};
use crate::pos::Pos;
use crate::tast::{TExpr, TExprDef};
use crate::types::{CallConv, Prim, Ty, TypePath};

pub(super) fn const_ty(c: &Const) -> Ty {
    match c {
        Const::Int(_) => Ty::Prim(Prim::Int),
        Const::Float(_) => Ty::Prim(Prim::Float),
        Const::Str(_) => Ty::Prim(Prim::Str),
        Const::Bool(_) => Ty::Prim(Prim::Bool),
        Const::Null => Ty::Prim(Prim::Void),
    }
}

pub(super) fn param_tys(params: &[Param]) -> Vec<Ty> {
    params.iter().map(|p| p.ty.clone()).collect()
}

/// The calling convention of a method: `@CallConv("vararg")` marks a
/// variadic signature, anything else is a fixed-arity one.
pub(super) fn func_conv(m: &MemberDef) -> CallConv {
    match m.atts.get("CallConv") {
        Some(Const::Str(s)) if s == "vararg" => CallConv::VarArgs,
        _ => CallConv::Normal,
    }
}

impl TypeContext {
    fn err(&self, kind: TypeErrorKind, pos: &Pos) -> TypeError {
        TypeError::new(kind, pos.clone())
    }

    /// The parent path of the enclosing class, for `super`.
    fn super_path(&self, pos: &Pos) -> Result<TypePath, TypeError> {
        let this = self
            .this_path
            .clone()
            .ok_or_else(|| self.err(TypeErrorKind::UnresolvedSuper, pos))?;
        let def = self.table.get(&this).map_err(|k| self.err(k, pos))?;
        match &def.kind {
            TypeDefKind::Class {
                extends: Some(parent),
                ..
            } => Ok(parent.clone()),
            _ => Err(self.err(TypeErrorKind::UnresolvedSuper, pos)),
        }
    }

    /// Resolve an identifier: scope stack first, then the members of the
    /// enclosing type (walking its parents), then a top-level type name in
    /// the default package, which supplies the class handle used as a
    /// static receiver.
    pub(super) fn find_var(
        &mut self,
        name: &str,
        pos: &Pos,
    ) -> Result<(Variability, Ty), TypeError> {
        if let Some((variability, ty)) = self.scopes.lookup(name) {
            return Ok((variability, ty.clone()));
        }

        if let Some(this) = self.this_path.clone() {
            match self.resolve_field(&Ty::Inst(this), name, pos) {
                Ok(hit) => return Ok(hit),
                Err(e) if matches!(e.kind, TypeErrorKind::UnresolvedField(..)) => {}
                Err(e) => return Err(e),
            }
        }

        let as_class = TypePath::plain(name);
        if self.table.contains(&as_class) {
            return Ok((Variability::Constant, Ty::Class(as_class)));
        }

        Err(self.err(TypeErrorKind::UnresolvedIdent(name.to_string()), pos))
    }

    /// Member lookup on an instance or class type, walking the `extends`
    /// chain child-first so a subclass shadows its parents. The visited
    /// set keeps a cyclic chain from looping; an exhausted walk reports
    /// the member as unknown.
    pub(super) fn resolve_field(
        &mut self,
        ty: &Ty,
        name: &str,
        pos: &Pos,
    ) -> Result<(Variability, Ty), TypeError> {
        let mut path = match ty {
            Ty::Inst(p) | Ty::Class(p) => p.clone(),
            other => return Err(self.err(TypeErrorKind::CannotField(other.clone()), pos)),
        };

        let mut visited = HashSet::new();
        loop {
            if !visited.insert(path.clone()) {
                break;
            }
            let (member, parent) = {
                let def = self.table.get(&path).map_err(|k| self.err(k, pos))?;
                let member = def.members.iter().find(|m| m.name == name).cloned();
                let parent = match &def.kind {
                    TypeDefKind::Class { extends, .. } => extends.clone(),
                    TypeDefKind::Struct => None,
                };
                (member, parent)
            };
            if let Some(m) = member {
                return self.member_type(&m);
            }
            match parent {
                Some(p) => path = p,
                None => break,
            }
        }

        Err(self.err(
            TypeErrorKind::UnresolvedField(ty.clone(), name.to_string()),
            pos,
        ))
    }

    /// The type of a member as seen from a use site. A field without an
    /// annotation takes the type of its initializer, which is typed on the
    /// spot.
    pub(super) fn member_type(
        &mut self,
        m: &MemberDef,
    ) -> Result<(Variability, Ty), TypeError> {
        match &m.kind {
            MemberKind::Var {
                variability,
                ty: Some(t),
                ..
            } => Ok((*variability, t.clone())),
            MemberKind::Var {
                variability,
                ty: None,
                init: Some(init),
            } => {
                let tinit = self.type_expr(init)?;
                Ok((*variability, tinit.ty))
            }
            MemberKind::Var {
                ty: None,
                init: None,
                ..
            } => Err(self.err(TypeErrorKind::UnresolvedFieldType(m.name.clone()), &m.pos)),
            MemberKind::Func { params, ret, .. } => Ok((
                Variability::Constant,
                Ty::Func(param_tys(params), Box::new(ret.clone()), func_conv(m)),
            )),
            MemberKind::Constr { params, .. } => Ok((
                Variability::Constant,
                Ty::Func(param_tys(params), Box::new(Ty::VOID), CallConv::Normal),
            )),
        }
    }

    /// Find a constructor on `path` whose parameter types equal `arg_tys`
    /// exactly. No implicit conversion applies.
    fn match_constr(
        &self,
        path: &TypePath,
        arg_tys: &[Ty],
        pos: &Pos,
    ) -> Result<(), TypeError> {
        let def = self.table.get(path).map_err(|k| self.err(k, pos))?;
        for m in &def.members {
            if let MemberKind::Constr { params, .. } = &m.kind {
                if params.len() == arg_tys.len()
                    && params.iter().zip(arg_tys).all(|(p, a)| &p.ty == a)
                {
                    return Ok(());
                }
            }
        }
        Err(self.err(
            TypeErrorKind::NoMatchingConstr(path.clone(), arg_tys.to_vec()),
            pos,
        ))
    }

    pub(super) fn type_expr(&mut self, e: &Expr) -> Result<TExpr, TypeError> {
        match &e.def {
            ExprDef::Const(c) => Ok(TExpr::new(
                TExprDef::Const(c.clone()),
                const_ty(c),
                e.pos.clone(),
            )),
            ExprDef::This => {
                let path = self
                    .this_path
                    .clone()
                    .ok_or_else(|| self.err(TypeErrorKind::UnresolvedThis, &e.pos))?;
                Ok(TExpr::new(TExprDef::This, Ty::Inst(path), e.pos.clone()))
            }
            ExprDef::Super => {
                let parent = self.super_path(&e.pos)?;
                Ok(TExpr::new(TExprDef::Super, Ty::Inst(parent), e.pos.clone()))
            }
            ExprDef::Ident(name) => {
                let (_, ty) = self.find_var(name, &e.pos)?;
                Ok(TExpr::new(TExprDef::Ident(name.clone()), ty, e.pos.clone()))
            }
            ExprDef::Field(obj, name) => {
                let tobj = self.type_expr(obj)?;
                let (_, ty) = self.resolve_field(&tobj.ty, name, &e.pos)?;
                Ok(TExpr::new(
                    TExprDef::Field(Box::new(tobj), name.clone()),
                    ty,
                    e.pos.clone(),
                ))
            }
            ExprDef::Index(obj, idx) => self.type_index(obj, idx, &e.pos),
            ExprDef::BinOp(op, a, b) if op.is_assign() => self.type_assign(*op, a, b, &e.pos),
            ExprDef::BinOp(op, a, b) => self.type_binop(*op, a, b, &e.pos),
            ExprDef::UnOp(op, operand) => {
                let toperand = self.type_expr(operand)?;
                let ok = match op {
                    UnOp::Neg => toperand.ty.is_numeric(),
                    UnOp::Not => toperand.ty == Ty::BOOL,
                };
                if !ok {
                    return Err(self.err(
                        TypeErrorKind::CannotBinOp(
                            op.symbol().to_string(),
                            toperand.ty.clone(),
                            toperand.ty.clone(),
                        ),
                        &e.pos,
                    ));
                }
                let ty = toperand.ty.clone();
                Ok(TExpr::new(
                    TExprDef::UnOp(*op, Box::new(toperand)),
                    ty,
                    e.pos.clone(),
                ))
            }
            ExprDef::Block(exprs) => {
                let mut texprs = Vec::new();
                for ex in exprs {
                    texprs.push(self.type_expr(ex)?);
                }
                let ty = texprs.last().map(|t| t.ty.clone()).unwrap_or(Ty::VOID);
                Ok(TExpr::new(TExprDef::Block(texprs), ty, e.pos.clone()))
            }
            ExprDef::Call(callee, args) if matches!(callee.def, ExprDef::Super) => {
                self.type_super_call(callee, args, &e.pos)
            }
            ExprDef::Call(callee, args) => self.type_call(callee, args, &e.pos),
            ExprDef::Paren(inner) => {
                let tinner = self.type_expr(inner)?;
                let ty = tinner.ty.clone();
                Ok(TExpr::new(
                    TExprDef::Paren(Box::new(tinner)),
                    ty,
                    e.pos.clone(),
                ))
            }
            ExprDef::If(cond, then, otherwise) => {
                let tcond = self.type_expr(cond)?;
                if tcond.ty != Ty::BOOL {
                    return Err(self.err(
                        TypeErrorKind::Expected(Ty::BOOL, tcond.ty.clone()),
                        &cond.pos,
                    ));
                }
                let tthen = self.type_expr(then)?;
                let telse = match otherwise {
                    Some(x) => Some(Box::new(self.type_expr(x)?)),
                    None => None,
                };
                // An if takes its then-branch's type, with or without else
                let ty = tthen.ty.clone();
                Ok(TExpr::new(
                    TExprDef::If(Box::new(tcond), Box::new(tthen), telse),
                    ty,
                    e.pos.clone(),
                ))
            }
            ExprDef::While(cond, body) => {
                let tcond = self.type_expr(cond)?;
                if tcond.ty != Ty::BOOL {
                    return Err(self.err(
                        TypeErrorKind::Expected(Ty::BOOL, tcond.ty.clone()),
                        &cond.pos,
                    ));
                }
                let tbody = self.type_expr(body)?;
                Ok(TExpr::new(
                    TExprDef::While(Box::new(tcond), Box::new(tbody)),
                    Ty::VOID,
                    e.pos.clone(),
                ))
            }
            ExprDef::Decl(variability, ann, name, init) => {
                let tinit = self.type_expr(init)?;
                if let Some(t) = ann {
                    if *t != tinit.ty {
                        return Err(self.err(
                            TypeErrorKind::Expected(t.clone(), tinit.ty.clone()),
                            &init.pos,
                        ));
                    }
                }
                if tinit.ty.is_void() {
                    return Err(self.err(TypeErrorKind::VoidVar, &e.pos));
                }
                self.scopes
                    .define(name.clone(), *variability, tinit.ty.clone());
                Ok(TExpr::new(
                    TExprDef::Decl(*variability, name.clone(), Box::new(tinit)),
                    Ty::VOID,
                    e.pos.clone(),
                ))
            }
            ExprDef::New(path, args) => self.type_new(path, args, &e.pos),
            ExprDef::Tuple(items) => {
                let mut titems = Vec::new();
                for item in items {
                    titems.push(self.type_expr(item)?);
                }
                let ty = Ty::Tuple(titems.iter().map(|t| t.ty.clone()).collect());
                Ok(TExpr::new(TExprDef::Tuple(titems), ty, e.pos.clone()))
            }
            ExprDef::Cast(inner, target) => {
                let tinner = self.type_expr(inner)?;
                if !self.table.can_cast(&tinner.ty, target) {
                    return Err(self.err(TypeErrorKind::CannotCastTo(target.clone()), &e.pos));
                }
                Ok(TExpr::new(
                    TExprDef::Cast(Box::new(tinner), target.clone()),
                    target.clone(),
                    e.pos.clone(),
                ))
            }
            ExprDef::Break => Ok(TExpr::new(TExprDef::Break, Ty::VOID, e.pos.clone())),
            ExprDef::Continue => Ok(TExpr::new(TExprDef::Continue, Ty::VOID, e.pos.clone())),
            ExprDef::Return(value) => {
                self.has_returned = true;
                let tvalue = match value {
                    Some(v) => Some(Box::new(self.type_expr(v)?)),
                    None => None,
                };
                Ok(TExpr::new(TExprDef::Return(tvalue), Ty::VOID, e.pos.clone()))
            }
        }
    }

    /// An assignment target is an identifier or a field, and the binding
    /// it resolves to must be a `var`.
    fn type_assign(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        pos: &Pos,
    ) -> Result<TExpr, TypeError> {
        let (variability, tlhs) = match &lhs.def {
            ExprDef::Ident(name) => {
                let (variability, ty) = self.find_var(name, &lhs.pos)?;
                (
                    variability,
                    TExpr::new(TExprDef::Ident(name.clone()), ty, lhs.pos.clone()),
                )
            }
            ExprDef::Field(obj, name) => {
                let tobj = self.type_expr(obj)?;
                let (variability, ty) = self.resolve_field(&tobj.ty, name, &lhs.pos)?;
                (
                    variability,
                    TExpr::new(TExprDef::Field(Box::new(tobj), name.clone()), ty, lhs.pos.clone()),
                )
            }
            _ => return Err(self.err(TypeErrorKind::InvalidLhs, &lhs.pos)),
        };

        if variability != Variability::Variable {
            return Err(self.err(TypeErrorKind::CannotAssign, &lhs.pos));
        }

        let trhs = self.type_expr(rhs)?;

        // A compound assignment carries its arithmetic operator's numeric
        // requirement; plain '=' only requires equal types.
        if op != BinOp::Assign && !(tlhs.ty.is_numeric() && trhs.ty.is_numeric()) {
            return Err(self.err(
                TypeErrorKind::CannotBinOp(
                    op.symbol().to_string(),
                    tlhs.ty.clone(),
                    trhs.ty.clone(),
                ),
                pos,
            ));
        }
        if tlhs.ty != trhs.ty {
            return Err(self.err(
                TypeErrorKind::CannotBinOp(
                    op.symbol().to_string(),
                    tlhs.ty.clone(),
                    trhs.ty.clone(),
                ),
                pos,
            ));
        }

        let ty = tlhs.ty.clone();
        Ok(TExpr::new(
            TExprDef::BinOp(op, Box::new(tlhs), Box::new(trhs)),
            ty,
            pos.clone(),
        ))
    }

    fn type_binop(
        &mut self,
        op: BinOp,
        a: &Expr,
        b: &Expr,
        pos: &Pos,
    ) -> Result<TExpr, TypeError> {
        let ta = self.type_expr(a)?;
        let tb = self.type_expr(b)?;

        let ty = if op.is_comparison() {
            if ta.ty != tb.ty {
                return Err(self.err(
                    TypeErrorKind::CannotBinOp(
                        op.symbol().to_string(),
                        ta.ty.clone(),
                        tb.ty.clone(),
                    ),
                    pos,
                ));
            }
            Ty::BOOL
        } else {
            if !(ta.ty.is_numeric() && tb.ty.is_numeric() && ta.ty == tb.ty) {
                return Err(self.err(
                    TypeErrorKind::CannotBinOp(
                        op.symbol().to_string(),
                        ta.ty.clone(),
                        tb.ty.clone(),
                    ),
                    pos,
                ));
            }
            ta.ty.clone()
        };

        Ok(TExpr::new(
            TExprDef::BinOp(op, Box::new(ta), Box::new(tb)),
            ty,
            pos.clone(),
        ))
    }

    /// `super(args)`: constructor delegation to the parent class, matched
    /// by exact parameter types.
    fn type_super_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        pos: &Pos,
    ) -> Result<TExpr, TypeError> {
        let parent = self.super_path(&callee.pos)?;

        let mut targs = Vec::new();
        for a in args {
            targs.push(self.type_expr(a)?);
        }
        let arg_tys: Vec<Ty> = targs.iter().map(|t| t.ty.clone()).collect();
        self.match_constr(&parent, &arg_tys, pos)?;

        let tcallee = TExpr::new(TExprDef::Super, Ty::Inst(parent), callee.pos.clone());
        Ok(TExpr::new(
            TExprDef::Call(Box::new(tcallee), targs),
            Ty::VOID,
            pos.clone(),
        ))
    }

    fn type_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        pos: &Pos,
    ) -> Result<TExpr, TypeError> {
        let tcallee = self.type_expr(callee)?;
        let (params, ret, conv) = match &tcallee.ty {
            Ty::Func(params, ret, conv) => (params.clone(), (**ret).clone(), *conv),
            other => {
                return Err(self.err(TypeErrorKind::CannotCall(other.clone()), &callee.pos))
            }
        };

        let mut targs = Vec::new();
        for a in args {
            targs.push(self.type_expr(a)?);
        }
        let arg_tys: Vec<Ty> = targs.iter().map(|t| t.ty.clone()).collect();

        let ok = match conv {
            CallConv::Normal => {
                arg_tys.len() == params.len()
                    && params.iter().zip(&arg_tys).all(|(p, a)| p == a)
            }
            // Trailing arguments beyond the fixed parameters are unchecked
            CallConv::VarArgs => {
                arg_tys.len() >= params.len()
                    && params.iter().zip(&arg_tys).all(|(p, a)| p == a)
            }
        };
        if !ok {
            return Err(self.err(
                TypeErrorKind::FunctionArgsMismatch(tcallee.ty.clone(), params, arg_tys),
                pos,
            ));
        }

        Ok(TExpr::new(
            TExprDef::Call(Box::new(tcallee), targs),
            ret,
            pos.clone(),
        ))
    }

    fn type_new(
        &mut self,
        path: &TypePath,
        args: &[Expr],
        pos: &Pos,
    ) -> Result<TExpr, TypeError> {
        self.table.get(path).map_err(|k| self.err(k, pos))?;

        let mut targs = Vec::new();
        for a in args {
            targs.push(self.type_expr(a)?);
        }
        let arg_tys: Vec<Ty> = targs.iter().map(|t| t.ty.clone()).collect();
        self.match_constr(path, &arg_tys, pos)?;

        Ok(TExpr::new(
            TExprDef::New(path.clone(), targs),
            Ty::Inst(path.clone()),
            pos.clone(),
        ))
    }

    /// Tuple indexing requires a constant integer index within bounds; the
    /// element type is known statically.
    fn type_index(&mut self, obj: &Expr, idx: &Expr, pos: &Pos) -> Result<TExpr, TypeError> {
        let tobj = self.type_expr(obj)?;
        let tidx = self.type_expr(idx)?;

        let Ty::Tuple(items) = &tobj.ty else {
            return Err(self.err(TypeErrorKind::CannotIndex, pos));
        };
        let k = match &idx.def {
            ExprDef::Const(Const::Int(k)) => *k,
            _ => return Err(self.err(TypeErrorKind::CannotIndex, pos)),
        };
        if k < 0 || k as usize >= items.len() {
            return Err(self.err(TypeErrorKind::CannotIndex, pos));
        }

        let ty = items[k as usize].clone();
        Ok(TExpr::new(
            TExprDef::Index(Box::new(tobj), Box::new(tidx)),
            ty,
            pos.clone(),
        ))
    }
}

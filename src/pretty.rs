/// Renders a typed tree back to Mo source text.
///
/// The output re-parses to the same untyped structure: grouping is kept as
/// explicit paren nodes in the tree, so no precedence-driven
/// parenthesization is needed here.
use crate::ast::{Const, MemberMod, TypeDefKind, Variability};
use crate::tast::{TExpr, TExprDef, TMemberDef, TMemberKind, TTypeDef, TypedModule};

pub fn module(m: &TypedModule) -> String {
    let mut p = Printer::new();
    if !m.package.is_empty() {
        p.line(&format!("package {}", m.package.join(".")));
        p.blank();
    }
    for imp in &m.imports {
        p.line(&format!("import {}", imp));
    }
    if !m.imports.is_empty() {
        p.blank();
    }
    for (i, def) in m.defs.iter().enumerate() {
        if i > 0 {
            p.blank();
        }
        p.type_def(def);
    }
    p.out
}

/// A single expression on one logical line (blocks still span lines).
pub fn expr(e: &TExpr) -> String {
    let mut p = Printer::new();
    p.expr(e);
    p.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Printer {
            out: String::new(),
            indent: 0,
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn line(&mut self, s: &str) {
        self.pad();
        self.push(s);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn type_def(&mut self, def: &TTypeDef) {
        self.pad();
        self.mods(&def.mods, &[MemberMod::Public, MemberMod::Private]);
        match &def.kind {
            TypeDefKind::Class {
                extends,
                implements,
            } => {
                self.push(&format!("class {}", def.path.name));
                if let Some(parent) = extends {
                    self.push(&format!(" extends {}", parent));
                }
                if !implements.is_empty() {
                    let list = implements
                        .iter()
                        .map(|p| p.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.push(&format!(" implements {}", list));
                }
            }
            TypeDefKind::Struct => self.push(&format!("struct {}", def.path.name)),
        }
        self.push(" {\n");
        self.indent += 1;
        for (i, m) in def.members.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            self.member(m);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn member(&mut self, m: &TMemberDef) {
        for (name, value) in sorted_atts(m) {
            self.line(&format!("@{}({})", name, const_str(value)));
        }
        self.pad();
        self.mods(
            &m.mods,
            &[
                MemberMod::Public,
                MemberMod::Private,
                MemberMod::Extern,
                MemberMod::Static,
            ],
        );
        match &m.kind {
            TMemberKind::Var {
                variability,
                ty,
                init,
            } => {
                let kw = match variability {
                    Variability::Variable => "var",
                    Variability::Constant => "val",
                };
                self.push(&format!("{} {}: {}", kw, m.name, ty));
                if let Some(init) = init {
                    self.push(" = ");
                    self.expr(init);
                }
                self.out.push('\n');
            }
            TMemberKind::Func { params, ret, body } => {
                self.push(&format!("func {}(", m.name));
                self.params(params);
                self.push(")");
                if !ret.is_void() {
                    self.push(&format!(": {}", ret));
                }
                match body {
                    Some(body) => {
                        self.push(" ");
                        self.expr(body);
                        self.out.push('\n');
                    }
                    None => self.out.push('\n'),
                }
            }
            TMemberKind::Constr { params, body } => {
                self.push("new(");
                self.params(params);
                self.push(") ");
                self.expr(body);
                self.out.push('\n');
            }
        }
    }

    fn params(&mut self, params: &[crate::ast::Param]) {
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&format!("{}: {}", p.name, p.ty));
        }
    }

    fn mods(&mut self, mods: &std::collections::HashSet<MemberMod>, order: &[MemberMod]) {
        for m in order {
            if mods.contains(m) {
                let kw = match m {
                    MemberMod::Static => "static",
                    MemberMod::Public => "public",
                    MemberMod::Private => "private",
                    MemberMod::Extern => "extern",
                };
                self.push(kw);
                self.push(" ");
            }
        }
    }

    fn expr(&mut self, e: &TExpr) {
        match &e.def {
            TExprDef::This => self.push("this"),
            TExprDef::Super => self.push("super"),
            TExprDef::Const(c) => {
                let s = const_str(c);
                self.push(&s);
            }
            TExprDef::Ident(name) => self.push(name),
            TExprDef::Field(obj, name) => {
                self.expr(obj);
                self.push(&format!(".{}", name));
            }
            TExprDef::Index(obj, idx) => {
                self.expr(obj);
                self.push("[");
                self.expr(idx);
                self.push("]");
            }
            TExprDef::BinOp(op, a, b) => {
                self.expr(a);
                self.push(&format!(" {} ", op.symbol()));
                self.expr(b);
            }
            TExprDef::UnOp(op, operand) => {
                self.push(op.symbol());
                self.expr(operand);
            }
            TExprDef::Block(exprs) => {
                if exprs.is_empty() {
                    self.push("{ }");
                    return;
                }
                self.push("{\n");
                self.indent += 1;
                for ex in exprs {
                    self.pad();
                    self.expr(ex);
                    self.out.push('\n');
                }
                self.indent -= 1;
                self.pad();
                self.push("}");
            }
            TExprDef::Call(callee, args) => {
                self.expr(callee);
                self.push("(");
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(a);
                }
                self.push(")");
            }
            TExprDef::Paren(inner) => {
                self.push("(");
                self.expr(inner);
                self.push(")");
            }
            TExprDef::If(cond, then, otherwise) => {
                self.push("if ");
                self.expr(cond);
                self.push(" ");
                self.expr(then);
                if let Some(e) = otherwise {
                    self.push(" else ");
                    self.expr(e);
                }
            }
            TExprDef::While(cond, body) => {
                self.push("while ");
                self.expr(cond);
                self.push(" ");
                self.expr(body);
            }
            TExprDef::Decl(variability, name, init) => {
                let kw = match variability {
                    Variability::Variable => "var",
                    Variability::Constant => "val",
                };
                self.push(&format!("{} {} = ", kw, name));
                self.expr(init);
            }
            TExprDef::New(path, args) => {
                self.push(&format!("new {}(", path));
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(a);
                }
                self.push(")");
            }
            TExprDef::Tuple(items) => {
                self.push("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(item);
                }
                self.push(")");
            }
            TExprDef::Cast(inner, ty) => {
                self.expr(inner);
                self.push(&format!(" as {}", ty));
            }
            TExprDef::Break => self.push("break"),
            TExprDef::Continue => self.push("continue"),
            TExprDef::Return(value) => {
                self.push("return");
                if let Some(v) = value {
                    self.push(" ");
                    self.expr(v);
                }
            }
        }
    }
}

fn const_str(c: &Const) -> String {
    match c {
        Const::Int(i) => i.to_string(),
        Const::Float(f) => {
            // Keep a decimal point so the literal re-lexes as a float
            if f.fract() == 0.0 && f.is_finite() {
                format!("{:.1}", f)
            } else {
                format!("{}", f)
            }
        }
        Const::Str(s) => format!("\"{}\"", escape(s)),
        Const::Bool(b) => b.to_string(),
        Const::Null => "null".to_string(),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}

/// Attribute maps are unordered; emit them deterministically.
fn sorted_atts(m: &TMemberDef) -> Vec<(&String, &Const)> {
    let mut atts: Vec<_> = m.atts.iter().collect();
    atts.sort_by(|a, b| a.0.cmp(b.0));
    atts
}

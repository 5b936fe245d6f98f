use super::*;
use crate::ast::{Expr, ExprDef, Variability};
use crate::pos::Pos;
use crate::source::parse_module;
use crate::tast::{TExprDef, TMemberKind, TypedModule};
use crate::types::{Prim, Ty, TypePath};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn typed(src: &str) -> (TypedModule, TypeContext) {
    let module = parse_module(src, "test.mo").expect("parse failed");
    type_module(&module).expect("expected typing to succeed")
}

fn typing_error(src: &str) -> TypeError {
    let module = parse_module(src, "test.mo").expect("parse failed");
    match type_module(&module) {
        Ok(_) => panic!("expected a type error"),
        Err(e) => e,
    }
}

fn member_body<'a>(m: &'a TypedModule, def: &str, member: &str) -> &'a crate::tast::TExpr {
    let def = m
        .defs
        .iter()
        .find(|d| d.path.name == def)
        .expect("no such type");
    let member = def
        .members
        .iter()
        .find(|mm| mm.name == member)
        .expect("no such member");
    match &member.kind {
        TMemberKind::Func {
            body: Some(body), ..
        } => body,
        TMemberKind::Constr { body, .. } => body,
        _ => panic!("member has no body"),
    }
}

// ---------------------------------------------------------------------------
// Scope stack
// ---------------------------------------------------------------------------

#[test]
fn inner_frames_shadow_outer() {
    let mut scopes = ScopeStack::new();
    scopes.define("x", Variability::Variable, Ty::INT);
    scopes.push_scope();
    scopes.define("x", Variability::Constant, Ty::BOOL);

    let (variability, ty) = scopes.lookup("x").unwrap();
    assert_eq!(variability, Variability::Constant);
    assert_eq!(*ty, Ty::BOOL);

    scopes.pop_scope();
    let (variability, ty) = scopes.lookup("x").unwrap();
    assert_eq!(variability, Variability::Variable);
    assert_eq!(*ty, Ty::INT);
}

#[test]
fn later_bindings_shadow_within_a_frame() {
    let mut scopes = ScopeStack::new();
    scopes.define("x", Variability::Variable, Ty::INT);
    scopes.define("x", Variability::Constant, Ty::BOOL);
    let (variability, _) = scopes.lookup("x").unwrap();
    assert_eq!(variability, Variability::Constant);
}

#[test]
fn popped_frames_are_gone() {
    let mut scopes = ScopeStack::new();
    scopes.push_scope();
    scopes.define("local", Variability::Variable, Ty::INT);
    scopes.pop_scope();
    assert!(scopes.lookup("local").is_none());
}

// ---------------------------------------------------------------------------
// Cast checking
// ---------------------------------------------------------------------------

#[test]
fn numeric_casts_always_allowed() {
    let table = TypeTable::new();
    assert!(table.can_cast(&Ty::INT, &Ty::INT));
    assert!(table.can_cast(&Ty::INT, &Ty::Prim(Prim::Float)));
    assert!(table.can_cast(&Ty::Prim(Prim::Short), &Ty::INT));
    assert!(!table.can_cast(&Ty::BOOL, &Ty::INT));
    assert!(!table.can_cast(&Ty::INT, &Ty::BOOL));
}

#[test]
fn cast_walks_the_extends_chain() {
    let (_, cx) = typed(
        "class A { }\n\
         class B extends A { }\n\
         class C extends B { }\n",
    );
    let a = Ty::Inst(TypePath::plain("A"));
    let c = Ty::Inst(TypePath::plain("C"));
    assert!(cx.table.can_cast(&c, &a));
    assert!(!cx.table.can_cast(&a, &c));
}

#[test]
fn cast_to_implemented_interface() {
    let (_, cx) = typed(
        "class Shown { }\n\
         class A implements Shown { }\n\
         class B extends A { }\n",
    );
    let shown = Ty::Inst(TypePath::plain("Shown"));
    assert!(cx
        .table
        .can_cast(&Ty::Inst(TypePath::plain("A")), &shown));
    assert!(cx
        .table
        .can_cast(&Ty::Inst(TypePath::plain("B")), &shown));
}

#[test]
fn cyclic_extends_terminates_and_rejects() {
    let (_, cx) = typed(
        "class A extends B { }\n\
         class B extends A { }\n",
    );
    let a = Ty::Inst(TypePath::plain("A"));
    let other = Ty::Inst(TypePath::plain("Z"));
    assert!(!cx.table.can_cast(&a, &other));
}

// ---------------------------------------------------------------------------
// Member resolution
// ---------------------------------------------------------------------------

#[test]
fn field_inherited_from_parent() {
    let (m, _) = typed(
        "class Base {\n\
             var a: int\n\
             new(a: int) { this.a = a }\n\
         }\n\
         class Child extends Base {\n\
             new() { super(1) }\n\
             func touch(): int { this.a = 2 }\n\
         }\n",
    );
    let body = member_body(&m, "Child", "touch");
    let TExprDef::Block(exprs) = &body.def else {
        panic!("expected block")
    };
    // the assignment has the field's type
    assert_eq!(exprs[0].ty, Ty::INT);
}

#[test]
fn subclass_shadows_parent_member() {
    let (m, _) = typed(
        "class Base {\n\
             var x: int = 0\n\
         }\n\
         class Child extends Base {\n\
             var x: bool = true\n\
             func get(): bool { this.x }\n\
         }\n",
    );
    let body = member_body(&m, "Child", "get");
    assert_eq!(body.ty, Ty::BOOL);
}

#[test]
fn field_without_annotation_takes_init_type() {
    let (m, _) = typed(
        "class A {\n\
             var count = 3\n\
             func get(): int { this.count }\n\
         }\n",
    );
    let body = member_body(&m, "A", "get");
    assert_eq!(body.ty, Ty::INT);
}

#[test]
fn field_without_annotation_or_init_is_rejected() {
    let err = typing_error("class A { var broken }\n");
    assert!(matches!(err.kind, TypeErrorKind::UnresolvedFieldType(ref n) if n == "broken"));
}

#[test]
fn class_name_resolves_as_static_receiver() {
    let (m, _) = typed(
        "class Util {\n\
             static func helper(): int { 7 }\n\
         }\n\
         class A {\n\
             func go(): int { Util.helper() }\n\
         }\n",
    );
    let body = member_body(&m, "A", "go");
    assert_eq!(body.ty, Ty::INT);
}

#[test]
fn member_access_on_primitive_is_rejected() {
    let err = typing_error(
        "class A {\n\
             func go() { val x = 1\n x.y }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotField(_)));
}

// ---------------------------------------------------------------------------
// this / super
// ---------------------------------------------------------------------------

#[test]
fn this_outside_a_class_is_rejected() {
    let mut cx = TypeContext::new();
    let e = Expr::new(ExprDef::This, Pos::none());
    let err = cx.type_expr(&e).unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::UnresolvedThis));
}

#[test]
fn super_requires_a_parent() {
    let err = typing_error(
        "class A {\n\
             func go() { super.x }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::UnresolvedSuper));
}

#[test]
fn super_delegation_matches_exact_constructor() {
    typed(
        "class Base {\n\
             var a: int\n\
             var b: int\n\
             new(a: int, b: int) { this.a = a\n this.b = b }\n\
         }\n\
         class Main extends Base {\n\
             new() { super(1, 2) }\n\
         }\n",
    );
}

#[test]
fn super_delegation_without_matching_constructor() {
    let err = typing_error(
        "class Base {\n\
             new(a: int) { }\n\
         }\n\
         class Main extends Base {\n\
             new() { super(1, 2) }\n\
         }\n",
    );
    match err.kind {
        TypeErrorKind::NoMatchingConstr(path, args) => {
            assert_eq!(path, TypePath::plain("Base"));
            assert_eq!(args, vec![Ty::INT, Ty::INT]);
        }
        other => panic!("expected NoMatchingConstr, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

#[test]
fn vararg_call_checks_only_the_fixed_prefix() {
    let (m, _) = typed(
        "class A {\n\
             @CallConv(\"vararg\")\n\
             extern static func printf(fmt: string)\n\
             func go() { printf(\"%d %d\\n\", 1, 2) }\n\
         }\n",
    );
    let body = member_body(&m, "A", "go");
    let TExprDef::Block(exprs) = &body.def else {
        panic!("expected block")
    };
    assert_eq!(exprs[0].ty, Ty::VOID);
}

#[test]
fn vararg_call_with_missing_fixed_argument() {
    let err = typing_error(
        "class A {\n\
             @CallConv(\"vararg\")\n\
             extern static func printf(fmt: string)\n\
             func go() { printf() }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::FunctionArgsMismatch(..)));
}

#[test]
fn fixed_call_rejects_extra_arguments() {
    let err = typing_error(
        "class A {\n\
             func f(x: int): int { x }\n\
             func go() { f(1, 2) }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::FunctionArgsMismatch(..)));
}

#[test]
fn calling_a_non_function_is_rejected() {
    let err = typing_error(
        "class A {\n\
             func go() { val x = 1\n x(2) }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotCall(_)));
}

#[test]
fn constructor_matching_uses_exact_types() {
    // no implicit int → float conversion when selecting a constructor
    let err = typing_error(
        "class P {\n\
             new(x: float) { }\n\
         }\n\
         class A {\n\
             func go() { new P(1) }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::NoMatchingConstr(..)));
}

// ---------------------------------------------------------------------------
// Operators and L-values
// ---------------------------------------------------------------------------

#[test]
fn arithmetic_requires_identical_numeric_operands() {
    let err = typing_error(
        "class A {\n\
             func go(): int { 1 + 1.5 }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotBinOp(..)));
}

#[test]
fn comparison_produces_bool() {
    let (m, _) = typed(
        "class A {\n\
             func go(): bool { 1 < 2 }\n\
         }\n",
    );
    assert_eq!(member_body(&m, "A", "go").ty, Ty::BOOL);
}

#[test]
fn assignment_to_val_field_is_rejected() {
    let err = typing_error(
        "class Base {\n\
             val a: int = 0\n\
             new() { this.a = 1 }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotAssign));
}

#[test]
fn assignment_to_a_call_is_rejected() {
    let err = typing_error(
        "class A {\n\
             func f(): int { 1 }\n\
             func go() { f() = 2 }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::InvalidLhs));
}

#[test]
fn assignment_has_the_assigned_type() {
    let (m, _) = typed(
        "class A {\n\
             var x: int = 0\n\
             func go(): int { this.x = 4 }\n\
         }\n",
    );
    let body = member_body(&m, "A", "go");
    let TExprDef::Block(exprs) = &body.def else {
        panic!("expected block")
    };
    assert_eq!(exprs[0].ty, Ty::INT);
}

#[test]
fn negation_requires_a_numeric_operand() {
    let err = typing_error(
        "class A {\n\
             func go() { -true }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotBinOp(..)));
}

// ---------------------------------------------------------------------------
// Control flow and blocks
// ---------------------------------------------------------------------------

#[test]
fn empty_block_is_void() {
    let (m, _) = typed("class A { func go() { } }\n");
    assert_eq!(member_body(&m, "A", "go").ty, Ty::VOID);
}

#[test]
fn if_without_else_takes_the_then_type() {
    let (m, _) = typed(
        "class A {\n\
             func go(): int { if true { 1 } }\n\
         }\n",
    );
    assert_eq!(member_body(&m, "A", "go").ty, Ty::INT);
}

#[test]
fn condition_must_be_bool() {
    let err = typing_error(
        "class A {\n\
             func go() { if 1 { } }\n\
         }\n",
    );
    assert!(matches!(
        err.kind,
        TypeErrorKind::Expected(ref wanted, ref got)
            if *wanted == Ty::BOOL && *got == Ty::INT
    ));
}

#[test]
fn while_is_void() {
    let (m, _) = typed(
        "class A {\n\
             func go() { while true { break } }\n\
         }\n",
    );
    assert_eq!(member_body(&m, "A", "go").ty, Ty::VOID);
}

#[test]
fn body_matching_return_type_needs_no_return() {
    typed(
        "class A {\n\
             func f(): int { 1 + 2 }\n\
         }\n",
    );
}

#[test]
fn empty_body_with_int_return_type_is_rejected() {
    let err = typing_error(
        "class A {\n\
             func f(): int { }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::NoReturn));
}

#[test]
fn explicit_return_satisfies_the_body_check() {
    typed(
        "class A {\n\
             func f(): int {\n\
                 if true { return 1 }\n\
                 return 0\n\
             }\n\
         }\n",
    );
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[test]
fn null_binding_is_rejected() {
    let err = typing_error(
        "class A {\n\
             func go() { var x = null }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::VoidVar));
}

#[test]
fn declaration_annotation_must_match_init() {
    let err = typing_error(
        "class A {\n\
             func go() { var x: int = true }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::Expected(..)));
}

#[test]
fn declaration_is_void_but_binds_the_init_type() {
    let (m, _) = typed(
        "class A {\n\
             func go(): int {\n\
                 var x = 5\n\
                 x\n\
             }\n\
         }\n",
    );
    let body = member_body(&m, "A", "go");
    let TExprDef::Block(exprs) = &body.def else {
        panic!("expected block")
    };
    assert_eq!(exprs[0].ty, Ty::VOID);
    assert_eq!(exprs[1].ty, Ty::INT);
}

#[test]
fn field_annotation_must_match_init() {
    let err = typing_error("class A { var x: int = true }\n");
    assert!(matches!(err.kind, TypeErrorKind::Expected(..)));
}

// ---------------------------------------------------------------------------
// Tuples and indexing
// ---------------------------------------------------------------------------

#[test]
fn tuple_index_yields_the_element_type() {
    let (m, _) = typed(
        "class A {\n\
             func go(): string {\n\
                 val t = (1, \"two\")\n\
                 t[1]\n\
             }\n\
         }\n",
    );
    assert_eq!(member_body(&m, "A", "go").ty, Ty::Prim(Prim::Str));
}

#[test]
fn tuple_rejects_out_of_range_index() {
    let err = typing_error(
        "class A {\n\
             func go() { val t = (1, 2)\n t[2] }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotIndex));
}

#[test]
fn tuple_rejects_non_constant_index() {
    let err = typing_error(
        "class A {\n\
             func go() { val t = (1, 2)\n val i = 0\n t[i] }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotIndex));
}

#[test]
fn indexing_a_non_tuple_is_rejected() {
    let err = typing_error(
        "class A {\n\
             func go() { val x = 1\n x[0] }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotIndex));
}

// ---------------------------------------------------------------------------
// Casts
// ---------------------------------------------------------------------------

#[test]
fn cast_between_unrelated_classes_is_rejected() {
    let err = typing_error(
        "class A { new() { } }\n\
         class B {\n\
             func go() { new A() as B }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::CannotCastTo(_)));
}

#[test]
fn upcast_to_parent_is_accepted() {
    typed(
        "class Base { new() { } }\n\
         class Child extends Base {\n\
             new() { super() }\n\
             func go(): Base { new Child() as Base }\n\
         }\n",
    );
}

// ---------------------------------------------------------------------------
// Module-level rules
// ---------------------------------------------------------------------------

#[test]
fn duplicate_type_paths_are_rejected() {
    let err = typing_error("class A { }\nclass A { }\n");
    assert!(matches!(err.kind, TypeErrorKind::DuplicateType(_)));
}

#[test]
fn forward_references_resolve() {
    // Uses a class declared later in the module
    typed(
        "class A {\n\
             func go(): int { new B().x }\n\
         }\n\
         class B {\n\
             var x: int = 1\n\
             new() { }\n\
         }\n",
    );
}

#[test]
fn unknown_identifier_is_reported_with_its_position() {
    let err = typing_error(
        "class A {\n\
             func go() { nosuch }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::UnresolvedIdent(ref n) if n == "nosuch"));
    assert_eq!(err.pos.min.line, 2);
}

#[test]
fn unknown_new_path_is_rejected() {
    let err = typing_error(
        "class A {\n\
             func go() { new Missing() }\n\
         }\n",
    );
    assert!(matches!(err.kind, TypeErrorKind::UnresolvedPath(_)));
}

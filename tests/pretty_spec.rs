/// Spec tests for the pretty printer.
///
/// The key property is the round trip: printing a typed module and feeding
/// the text back through the front-end reaches a fixpoint after one pass,
/// and re-typing the printed text reproduces the original types.
use mo::pretty;
use mo::source::parse_module;
use mo::tast::TypedModule;
use mo::typer::type_module;

const BASE_MO: &str = include_str!("../demos/base.mo");

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn typed(src: &str) -> TypedModule {
    let module = parse_module(src, "test.mo").expect("parse failed");
    let (typed, _) = type_module(&module).expect("typing failed");
    typed
}

/// print → parse → type → print must reproduce the first print exactly.
fn assert_round_trip(src: &str) {
    let first = pretty::module(&typed(src));
    let second = pretty::module(&typed(&first));
    assert_eq!(first, second, "pretty output is not a fixpoint");
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn the_sample_program_round_trips() {
    assert_round_trip(BASE_MO);
}

#[test]
fn control_flow_round_trips() {
    assert_round_trip(
        "class A {\n\
             func count(n: int): int {\n\
                 var i = 0\n\
                 while i < n {\n\
                     if i == 2 { continue } else { i += 1 }\n\
                     break\n\
                 }\n\
                 i\n\
             }\n\
         }\n",
    );
}

#[test]
fn tuples_casts_and_grouping_round_trip() {
    assert_round_trip(
        "class A {\n\
             func go(): float {\n\
                 val t = (1, 2.5, \"three\")\n\
                 val g = (1 + 2) * 3\n\
                 t[1] as float\n\
             }\n\
         }\n",
    );
}

#[test]
fn packages_and_imports_round_trip() {
    assert_round_trip(
        "package geo\n\
         import util.Fmt\n\
         \n\
         class Point {\n\
             var x: int\n\
             new(x: int) { this.x = x }\n\
         }\n",
    );
}

#[test]
fn retyping_the_printed_text_preserves_types() {
    let original = typed(BASE_MO);
    let reprinted = typed(&pretty::module(&original));
    for (a, b) in original.defs.iter().zip(&reprinted.defs) {
        assert_eq!(a.path, b.path);
        for (ma, mb) in a.members.iter().zip(&b.members) {
            assert_eq!(ma.name, mb.name);
            assert_eq!(ma.ty, mb.ty, "member {} changed type", ma.name);
        }
    }
}

// ---------------------------------------------------------------------------
// Keyword fidelity
// ---------------------------------------------------------------------------

#[test]
fn continue_prints_as_continue() {
    let m = typed(
        "class A {\n\
             func go() {\n\
                 while true { continue }\n\
             }\n\
         }\n",
    );
    let out = pretty::module(&m);
    assert!(out.contains("continue"), "missing continue in:\n{}", out);
    assert!(!out.contains("break"), "continue printed as break:\n{}", out);
}

#[test]
fn extern_members_print_without_a_body() {
    let m = typed(BASE_MO);
    let out = pretty::module(&m);
    assert!(out.contains("extern static func printf(fmt: string)\n"));
    assert!(out.contains("@CallConv(\"vararg\")"));
    assert!(out.contains("@LinkName(\"printf\")"));
}

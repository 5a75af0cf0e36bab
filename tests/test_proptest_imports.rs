//! Property tests for the import fixer.
//!
//! Generated sources are built from random imports and qualified type
//! references; fixing must be idempotent and must always produce a sorted,
//! duplicate-free import block directly after the package line.
#![cfg(feature = "proptest")]

use overwrite::emit::imports::parse_imports;
use overwrite::emit::fix_source;
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

fn arb_package() -> impl Strategy<Value = String> {
    "[a-z]{1,5}(\\.[a-z]{1,5}){0,2}"
}

fn arb_type() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,6}"
}

fn arb_qualified() -> impl Strategy<Value = (String, String)> {
    (arb_package(), arb_type())
}

fn arb_import() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_qualified().prop_map(|(p, t)| format!("import {p}.{t};")),
        arb_package().prop_map(|p| format!("import {p}.*;")),
        (arb_qualified(), "[a-z]{1,4}").prop_map(|((p, t), m)| format!("import static {p}.{t}.{m};")),
    ]
}

fn arb_source() -> impl Strategy<Value = (String, String)> {
    (
        prop::collection::vec(arb_import(), 0..6),
        prop::collection::vec(arb_import(), 0..6),
        prop::collection::vec(arb_qualified(), 0..6),
    )
        .prop_map(|(emitted, common, fields)| {
            let mut generated = String::from("package p;\n\n");
            for import in &emitted {
                generated.push_str(import);
                generated.push('\n');
            }
            generated.push_str("\npublic class C {\n");
            for (i, (package, ty)) in fields.iter().enumerate() {
                generated.push_str(&format!("    {package}.{ty} f{i};\n"));
                generated.push_str(&format!("    java.lang.{ty} g{i};\n"));
            }
            generated.push_str("}\n");
            let common = format!("package p;\n{}\nclass C {{}}\n", common.join("\n"));
            (generated, common)
        })
}

proptest! {
    #[test]
    fn fix_source_is_idempotent((generated, common) in arb_source()) {
        let once = fix_source(&generated, &common, Some("p")).unwrap().unwrap();
        let twice = fix_source(&once, &common, Some("p")).unwrap().unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn imports_follow_package_sorted((generated, common) in arb_source()) {
        let fixed = fix_source(&generated, &common, Some("p")).unwrap().unwrap();
        prop_assert!(fixed.starts_with("package p;\n\n"));

        let imports = parse_imports(&fixed);
        let statements: Vec<_> = imports.iter().map(|i| i.statement.clone()).collect();
        let mut sorted = statements.clone();
        sorted.sort_by_key(|s| (s.starts_with("import static"), s.clone()));
        prop_assert_eq!(&statements, &sorted);

        let mut deduped = statements.clone();
        deduped.dedup();
        prop_assert_eq!(statements.len(), deduped.len());
    }
}

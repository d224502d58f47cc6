//! Integration tests for rule-driven record rewriting.
//!
//! These tests drive complete stores through the codec and verify that
//! explicit rules, per-record overrides, and registry-discovered renames
//! produce records that need no further work on a second pass.

use reclass::prelude::*;
use std::sync::Arc;

fn record(class_meta: &Value, state: &Value) -> Result<Vec<u8>> {
    let mut bytes = encode_value(class_meta)?;
    bytes.extend(encode_value(state)?);
    Ok(bytes)
}

fn live_with(types: &[(&str, &str)]) -> Arc<TypeRegistry> {
    let live = TypeRegistry::new();
    for (namespace, name) in types {
        live.register_type(TypeName::new(*namespace, *name), Rebuild::Constructor);
    }
    Arc::new(live)
}

fn decode_record(bytes: &[u8]) -> Result<(Value, Value)> {
    let mut parser = Parser::new(bytes);
    let mut hooks = IdentityHooks;
    let class_doc = read_document(&mut parser, &mut hooks)?;
    let state_doc = read_document(&mut parser, &mut hooks)?;
    Ok((class_doc.value, state_doc.value))
}

#[test]
fn explicit_rename_rewrites_and_settles() -> Result<()> {
    let live = live_with(&[("app.models", "Folder")]);
    let mut rules = RenameRules::new();
    rules.merge_source([("app.legacy Folder", "app.models Folder")])?;
    let mut codec = RecordCodec::new(rules, live);

    // Step 1: Build a store where one record still uses the legacy name,
    // both as its class and inside its state
    let mut store = vec![
        (
            Oid::new(1),
            record(
                &Value::Symbol(TypeName::new("app.legacy", "Folder")),
                &Value::Map(vec![(
                    Value::Str("kind".to_string()),
                    Value::Symbol(TypeName::new("app.legacy", "Folder")),
                )]),
            )?,
        ),
        (
            Oid::new(2),
            record(
                &Value::Symbol(TypeName::new("app.models", "Folder")),
                &Value::None,
            )?,
        ),
    ];

    // Step 2: First pass rewrites only the legacy record
    let mut rewritten = 0;
    for (oid, bytes) in &mut store {
        if let Some(replacement) = codec.process(*oid, bytes)? {
            *bytes = replacement;
            rewritten += 1;
        }
    }
    assert_eq!(rewritten, 1, "Only the legacy record should change");

    let (class_meta, state) = decode_record(&store[0].1)?;
    assert_eq!(
        class_meta,
        Value::Symbol(TypeName::new("app.models", "Folder"))
    );
    assert_eq!(
        state,
        Value::Map(vec![(
            Value::Str("kind".to_string()),
            Value::Symbol(TypeName::new("app.models", "Folder")),
        )])
    );

    // Step 3: A second pass over the rewritten store finds nothing to do
    for (oid, bytes) in &store {
        assert!(
            codec.process(*oid, bytes)?.is_none(),
            "Rewritten records must be stable"
        );
    }
    Ok(())
}

#[test]
fn override_beats_table_rule() -> Result<()> {
    let live = live_with(&[("app.models", "Folder"), ("app.models", "Archive")]);
    let mut rules = RenameRules::new();
    rules.merge_source([("app.legacy Folder", "app.models Folder")])?;
    rules.merge_overrides([("0x2a", "app.models Archive")])?;
    let mut codec = RecordCodec::new(rules, live);

    let stored = record(
        &Value::Symbol(TypeName::new("app.legacy", "Folder")),
        &Value::None,
    )?;

    // The override pins record 0x2a to Archive regardless of the table rule
    let updated = codec.process(Oid::new(0x2A), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(
        class_meta,
        Value::Symbol(TypeName::new("app.models", "Archive"))
    );

    // Any other record with the same class follows the table rule
    let updated = codec.process(Oid::new(0x2B), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(
        class_meta,
        Value::Symbol(TypeName::new("app.models", "Folder"))
    );
    Ok(())
}

#[test]
fn class_meta_tuple_shape_rewrites() -> Result<()> {
    let live = live_with(&[("app.models", "Folder")]);
    let mut rules = RenameRules::new();
    rules.merge_source([("app.legacy Folder", "app.models Folder")])?;
    let mut codec = RecordCodec::new(rules, live);

    // Class metadata stored as (class, constructor args)
    let stored = record(
        &Value::Tuple(vec![
            Value::Symbol(TypeName::new("app.legacy", "Folder")),
            Value::Tuple(vec![Value::Int(3)]),
        ]),
        &Value::None,
    )?;

    let updated = codec.process(Oid::new(1), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(
        class_meta,
        Value::Tuple(vec![
            Value::Symbol(TypeName::new("app.models", "Folder")),
            Value::Tuple(vec![Value::Int(3)]),
        ])
    );
    Ok(())
}

#[test]
fn rename_reaches_constructor_args() -> Result<()> {
    let live = live_with(&[("app.models", "Folder")]);
    let mut rules = RenameRules::new();
    rules.merge_source([("app.legacy Folder", "app.models Folder")])?;
    let mut codec = RecordCodec::new(rules, live);

    // The legacy name appears twice: as the class and again inside the
    // constructor arguments
    let stored = record(
        &Value::Tuple(vec![
            Value::Symbol(TypeName::new("app.legacy", "Folder")),
            Value::Tuple(vec![Value::Symbol(TypeName::new("app.legacy", "Folder"))]),
        ]),
        &Value::None,
    )?;

    let updated = codec.process(Oid::new(1), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(
        class_meta,
        Value::Tuple(vec![
            Value::Symbol(TypeName::new("app.models", "Folder")),
            Value::Tuple(vec![Value::Symbol(TypeName::new("app.models", "Folder"))]),
        ])
    );
    assert!(!codec.diagnostics().has_errors());

    // A record whose class is already modern can still carry the legacy
    // name in its arguments
    let stored = record(
        &Value::Tuple(vec![
            Value::Symbol(TypeName::new("app.models", "Folder")),
            Value::Tuple(vec![Value::Symbol(TypeName::new("app.legacy", "Folder"))]),
        ]),
        &Value::None,
    )?;

    let updated = codec.process(Oid::new(2), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(
        class_meta,
        Value::Tuple(vec![
            Value::Symbol(TypeName::new("app.models", "Folder")),
            Value::Tuple(vec![Value::Symbol(TypeName::new("app.models", "Folder"))]),
        ])
    );
    assert!(codec.process(Oid::new(2), &updated)?.is_none());
    Ok(())
}

#[test]
fn registry_alias_discovery_is_reported() -> Result<()> {
    // The registry itself records the move; no explicit rule exists
    let live = TypeRegistry::new();
    live.register_type(TypeName::new("app.new", "Document"), Rebuild::Constructor);
    live.register_alias(
        TypeName::new("app.old", "Document"),
        TypeName::new("app.new", "Document"),
    );
    let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(live));

    let stored = record(
        &Value::Symbol(TypeName::new("app.old", "Document")),
        &Value::None,
    )?;

    let updated = codec.process(Oid::new(1), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(
        class_meta,
        Value::Symbol(TypeName::new("app.new", "Document"))
    );

    // The discovery is reported exactly once, even across further records
    assert!(codec.process(Oid::new(2), &stored)?.is_some());
    let discovered = codec.discovered_rules();
    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered["app.old Document"], "app.new Document");
    assert_eq!(codec.diagnostics().info_count(), 1);
    Ok(())
}

#[test]
fn discovered_rules_persist_across_runs() -> Result<()> {
    let stored = record(
        &Value::Symbol(TypeName::new("app.old", "Document")),
        &Value::None,
    )?;

    // Step 1: A first run discovers the rename from a registry alias
    let live = TypeRegistry::new();
    live.register_type(TypeName::new("app.new", "Document"), Rebuild::Constructor);
    live.register_alias(
        TypeName::new("app.old", "Document"),
        TypeName::new("app.new", "Document"),
    );
    let mut first = RecordCodec::new(RenameRules::new(), Arc::new(live));
    assert!(first.process(Oid::new(1), &stored)?.is_some());
    let discovered = first.discovered_rules();

    // Step 2: A later run has no alias, only the persisted rule
    let mut rules = RenameRules::new();
    rules.merge_source(
        discovered
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str())),
    )?;
    let mut second = RecordCodec::new(rules, live_with(&[("app.new", "Document")]));

    let updated = second.process(Oid::new(1), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(
        class_meta,
        Value::Symbol(TypeName::new("app.new", "Document"))
    );
    assert!(second.discovered_rules().is_empty());
    Ok(())
}

#[test]
fn discovery_is_stable_against_registry_churn() -> Result<()> {
    let live = TypeRegistry::new();
    live.register_type(TypeName::new("app.v2", "Widget"), Rebuild::Constructor);
    live.register_type(TypeName::new("app.v3", "Widget"), Rebuild::Constructor);
    live.register_alias(
        TypeName::new("app.v1", "Widget"),
        TypeName::new("app.v2", "Widget"),
    );
    let shared = Arc::new(live);
    let mut codec = RecordCodec::new(RenameRules::new(), shared.clone());

    let stored = record(
        &Value::Symbol(TypeName::new("app.v1", "Widget")),
        &Value::None,
    )?;

    // First record fixes the discovered target
    let updated = codec.process(Oid::new(1), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(class_meta, Value::Symbol(TypeName::new("app.v2", "Widget")));

    // The alias shifts mid-run; already-discovered records keep their target
    shared.register_alias(
        TypeName::new("app.v1", "Widget"),
        TypeName::new("app.v3", "Widget"),
    );
    let updated = codec.process(Oid::new(2), &stored)?.unwrap();
    let (class_meta, _) = decode_record(&updated)?;
    assert_eq!(class_meta, Value::Symbol(TypeName::new("app.v2", "Widget")));
    assert_eq!(codec.discovered_rules()["app.v1 Widget"], "app.v2 Widget");
    Ok(())
}

#[test]
fn rewrite_reaches_nested_state() -> Result<()> {
    let live = live_with(&[("app.models", "Folder")]);
    let mut rules = RenameRules::new();
    rules.merge_source([("app.legacy Folder", "app.models Folder")])?;
    let mut codec = RecordCodec::new(rules, live);

    let legacy = TypeName::new("app.legacy", "Folder");
    let stored = record(
        &Value::Symbol(legacy.clone()),
        &Value::Map(vec![(
            Value::Str("children".to_string()),
            Value::List(vec![
                Value::Object(Box::new(Instance::new(
                    legacy.clone(),
                    vec![],
                    Value::Map(vec![]),
                ))),
                Value::Symbol(legacy),
            ]),
        )]),
    )?;

    let updated = codec.process(Oid::new(1), &stored)?.unwrap();
    let (_, state) = decode_record(&updated)?;

    let modern = TypeName::new("app.models", "Folder");
    assert_eq!(
        state,
        Value::Map(vec![(
            Value::Str("children".to_string()),
            Value::List(vec![
                Value::Object(Box::new(Instance::new(
                    modern.clone(),
                    vec![],
                    Value::Map(vec![]),
                ))),
                Value::Symbol(modern),
            ]),
        )])
    );
    Ok(())
}

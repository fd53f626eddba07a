use std::io::Write;

use refsweep_core::{
    CorpusManifest, Field, LiteralScriptCompiler, LoadError, ManifestError, ResourceContent,
    ResourceIdentity, ResourceStore, ScanConfig, ScanError, ScriptCompiler, ScriptKind,
    StringTable, TypeTag, flatten_fields,
};

const MANIFEST: &str = r#"{
    "strings": [
        { "index": 0, "audio": "GREET01" },
        { "index": 1 },
        { "index": 2, "audio": "  " }
    ],
    "resources": [
        { "id": "SW1H01.ITM", "label": "Long Sword",
          "content": { "type": "structured", "fields": [] } },
        { "id": "guard.cre",
          "content": { "type": "structured", "fields": [
              { "resource_ref": { "kind": "ITM", "name": "SW1H01" } },
              { "string_ref": 0 },
              { "group": { "label": "effects", "fields": [
                  { "resource_ref": { "kind": "SPL", "name": "SPWI101" } },
                  "other"
              ] } }
          ] } },
        { "id": "GUARD.DLG",
          "content": { "type": "script_bearing",
                       "fragments": [
                           { "kind": "action", "source": "GiveItem(\"RING01.ITM\",Player1)" }
                       ],
                       "sections": [ { "kind": "state", "fields": [ { "string_ref": 0 } ] } ] } },
        { "id": "AREA01.BCS",
          "content": { "type": "compiled_script", "bytecode": "SC script\nTrue()\nSC\n" } },
        { "id": "ITEMS.2DA", "content": { "type": "plain_text", "text": "2DA V1.0" } },
        { "id": "BROKEN.CRE", "corrupt": "truncated header" },
        { "id": "GONE.ITM" }
    ]
}"#;

#[test]
fn test_type_tag_normalization() {
    assert_eq!(TypeTag::new(".itm"), TypeTag::new("ITM"));
    assert!(TypeTag::new("wav").is_audio());
    assert!(TypeTag::new("DLG").is_checkable());
    assert!(TypeTag::new("2DA").is_scannable());
    assert!(!TypeTag::new("2DA").is_checkable());
    assert!(!TypeTag::new("TIS").is_scannable());
}

#[test]
fn test_identity_is_case_insensitive() {
    let a: ResourceIdentity = "sw1h01.itm".parse().unwrap();
    let b = ResourceIdentity::new("SW1H01", "ITM");

    assert_eq!(a, b);
    assert_eq!(b.to_string(), "SW1H01.ITM");
    assert!(b.matches_file_name("Sw1h01.Itm"));
    assert!("NOEXTENSION".parse::<ResourceIdentity>().is_err());
}

#[test]
fn test_manifest_builds_store() {
    let (store, strings) = CorpusManifest::from_json(MANIFEST).unwrap().into_parts();

    let items = store.list_resources(&TypeTag::new("ITM")).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        store.list_resources(&TypeTag::new("CRE")).unwrap().len(),
        2
    );
    let audio = store.list_resources(&TypeTag::audio()).unwrap();
    assert!(audio.is_empty());

    let guard = ResourceIdentity::new("GUARD", "CRE");
    match store.load(&guard).unwrap() {
        ResourceContent::Structured(record) => {
            let refs: Vec<_> = record
                .flatten_fields()
                .into_iter()
                .filter_map(Field::reference)
                .map(|r| r.to_string())
                .collect();
            assert_eq!(refs, vec!["SW1H01.ITM", "SPWI101.SPL"]);
        }
        other => panic!("unexpected content shape: {}", other.shape()),
    }

    assert_eq!(
        store.search_string(&ResourceIdentity::new("SW1H01", "ITM")).as_deref(),
        Some("Long Sword")
    );
    assert!(store.search_string(&guard).is_none());

    assert_eq!(strings.resolve_audio(0).as_deref(), Some("GREET01"));
    assert!(strings.resolve_audio(1).is_none());
    assert!(strings.resolve_audio(2).is_none());
}

#[test]
fn test_manifest_load_failures() {
    let (store, _) = CorpusManifest::from_json(MANIFEST).unwrap().into_parts();

    let broken = ResourceIdentity::new("BROKEN", "CRE");
    assert!(matches!(
        store.load(&broken),
        Err(LoadError::Corrupt { .. })
    ));

    let gone = ResourceIdentity::new("GONE", "ITM");
    assert!(matches!(store.load(&gone), Err(LoadError::NotFound { .. })));

    let never_listed = ResourceIdentity::new("NOPE", "SPL");
    assert!(matches!(
        store.load(&never_listed),
        Err(LoadError::NotFound { .. })
    ));
}

#[test]
fn test_manifest_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();

    let manifest = CorpusManifest::from_path(file.path()).unwrap();
    assert_eq!(manifest.resources.len(), 7);
    assert_eq!(manifest.strings.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        CorpusManifest::from_path(&missing),
        Err(ManifestError::Io { .. })
    ));
}

#[test]
fn test_invalid_manifest() {
    let json = r#"{"resources":[{"id":"NOEXT"}]}"#;
    let err = CorpusManifest::from_json(json).unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
}

#[test]
fn test_literal_compiler_round_trip() {
    let compiler = LiteralScriptCompiler::new();
    let bytecode = compiler
        .compile(
            "CreateItem(\"potn01.itm\",1,0,0)\nDisplayString(\"not a ref\")",
            ScriptKind::Action,
        )
        .unwrap();

    let decompiled = compiler.decompile(&bytecode, ScriptKind::Action).unwrap();
    let refs: Vec<_> = decompiled
        .references
        .iter()
        .map(|r| r.to_string())
        .collect();
    assert_eq!(refs, vec!["potn01.ITM"]);
    assert!(decompiled.source.contains("CreateItem"));
}

#[test]
fn test_literal_compiler_rejects_malformed_source() {
    let compiler = LiteralScriptCompiler::new();
    for source in ["Foo(\"BAR.ITM\"", "Foo(\"BAR.ITM)"] {
        assert!(compiler.compile(source, ScriptKind::Trigger).is_err());
    }
    assert!(compiler.decompile("garbage", ScriptKind::Script).is_err());
}

#[test]
fn test_config_round_trips_through_json() {
    let config = ScanConfig::builder()
        .target_kind("spl")
        .concurrency_limit(2usize)
        .scannable_kinds(vec![TypeTag::new("CRE"), TypeTag::new("ITM")])
        .build()
        .unwrap();

    let json = serde_json::to_string(&config).unwrap();
    let back: ScanConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.target_kind, TypeTag::new("SPL"));
    assert_eq!(back.scannable_kinds.len(), 2);
    assert_eq!(back.concurrency_limit, 2);
}

#[test]
fn test_config_rejects_empty_target() {
    let config = ScanConfig::new("");
    assert!(matches!(
        config.validate(),
        Err(ScanError::InvalidConfig { .. })
    ));
}

#[test]
fn test_flatten_fields_skips_groups() {
    let fields = vec![
        Field::resource_ref("A", "ITM"),
        Field::Group {
            label: "outer".into(),
            fields: vec![Field::Group {
                label: "inner".into(),
                fields: vec![Field::StringRef(3)],
            }],
        },
        Field::Other,
    ];

    let flat = flatten_fields(&fields);
    assert_eq!(flat.len(), 3);
    assert!(flat.iter().all(|f| !matches!(f, Field::Group { .. })));
}

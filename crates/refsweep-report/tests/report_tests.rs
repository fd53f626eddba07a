use std::fs;
use std::time::Duration;

use refsweep_core::{
    Field, MemoryStore, ResourceContent, ResourceIdentity, ScanOutcome, ScanStats,
    StructuredRecord, TypeTag, UnusedResources,
};
use refsweep_report::{ReportError, ScanStatus, UnusedReport};

fn labeled_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .insert_labeled(
            ResourceIdentity::new("SW1H02", "ITM"),
            ResourceContent::Structured(StructuredRecord::new(vec![])),
            "Short Sword +1",
        )
        .insert(
            ResourceIdentity::new("AMUL01", "ITM"),
            ResourceContent::Structured(StructuredRecord::new(vec![Field::Other])),
        );
    store
}

fn unused_items() -> UnusedResources {
    UnusedResources {
        target_kind: TypeTag::new("ITM"),
        resources: vec![
            ResourceIdentity::new("SW1H02", "ITM"),
            ResourceIdentity::new("AMUL01", "ITM"),
        ],
        stats: ScanStats {
            total_resources: 40,
            scanned: 40,
            initial_candidates: 12,
            removed: 10,
            ..Default::default()
        },
        scan_duration: Duration::from_millis(1500),
    }
}

#[test]
fn test_report_uses_store_labels() {
    let store = labeled_store();
    let report = UnusedReport::new(unused_items(), &store);

    assert_eq!(report.len(), 2);
    assert_eq!(report.entries[0].resource.to_string(), "AMUL01.ITM");
    assert_eq!(report.entries[0].search_string, "");
    assert_eq!(report.entries[1].search_string, "Short Sword +1");
    assert_eq!(report.summary(), "2 unused ITMs found");
    assert_eq!(
        report.stats_line(),
        "40 resources scanned, 12 candidates, 10 referenced in 1.5s"
    );
}

#[test]
fn test_save_report() {
    let store = labeled_store();
    let report = UnusedReport::new(unused_items(), &store);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.txt");
    fs::write(&path, "stale contents").unwrap();
    report.save(&path).unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = saved.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Result of ITM usage check",
            "Number of hits: 2",
            "File: AMUL01.ITM  Name: ",
            "File: SW1H02.ITM  Name: Short Sword +1",
        ]
    );
}

#[test]
fn test_save_into_missing_directory_fails() {
    let report = UnusedReport::new(unused_items(), &labeled_store());
    let dir = tempfile::tempdir().unwrap();

    let err = report
        .save(dir.path().join("no-such-dir").join("result.txt"))
        .unwrap_err();
    assert!(matches!(err, ReportError::Io { .. }));
}

#[test]
fn test_json_rendering() {
    let report = UnusedReport::new(unused_items(), &labeled_store());
    let json = report.to_json().unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["target_kind"], "ITM");
    assert_eq!(value["entries"][1]["resource"], "SW1H02.ITM");
    assert_eq!(value["entries"][1]["search_string"], "Short Sword +1");
    assert_eq!(value["stats"]["removed"], 10);
}

#[test]
fn test_status_from_completed_scan() {
    let store = labeled_store();
    let status = ScanStatus::from_result(Ok(ScanOutcome::Completed(unused_items())), &store);

    assert_eq!(status.message(), "2 unused ITMs found");
    assert_eq!(status.report().map(UnusedReport::len), Some(2));
}

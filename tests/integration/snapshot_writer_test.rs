use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use resolverd::core::resolver::snapshot::{MonitorSnapshot, NetworkLoad};
use resolverd::core::resolver::SnapshotWriter;
use serde_json::{json, Value};
use tempfile::TempDir;

#[test]
fn test_concurrent_reader_never_sees_partial_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monitor.json");
    let writer = SnapshotWriter::new();
    writer.write(&path, &json!({"cycle": 0})).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let path = path.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut reads = 0;
            while !done.load(Ordering::SeqCst) {
                let content = fs::read_to_string(&path).unwrap();
                let parsed: Value = serde_json::from_str(&content).unwrap();
                assert!(parsed["cycle"].is_u64());
                reads += 1;
            }
            reads
        })
    };

    let padding = "x".repeat(64 * 1024);
    for cycle in 1..200u64 {
        writer
            .write(&path, &json!({"cycle": cycle, "padding": padding}))
            .unwrap();
    }
    done.store(true, Ordering::SeqCst);

    assert!(reader.join().unwrap() > 0);
}

#[test]
fn test_monitor_document_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monitor.json");

    let snapshot = MonitorSnapshot {
        timestamp: 1_700_000_000,
        network: Some(NetworkLoad::down()),
        ..Default::default()
    };
    SnapshotWriter::new().write(&path, &snapshot).unwrap();

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["timestamp"], 1_700_000_000);
    assert_eq!(parsed["network"], json!({"up": false}));
    assert_eq!(
        parsed["loads"],
        json!({"cpu": null, "memory": null, "gpu": null, "disk": null})
    );
    assert!(parsed["thermals"].is_null());
    assert!(parsed["listeners"].is_null());

    let back: MonitorSnapshot = serde_json::from_value(parsed).unwrap();
    assert_eq!(back, snapshot);
}

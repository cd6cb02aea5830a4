//! Replay files on disk.

use std::path::PathBuf;

use cardtable_replay::{Recorder, ReplayError};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cardtable-{}-{name}.rep.gz", std::process::id()))
}

#[test]
fn test_dump_then_read_file_keeps_entries() {
    let path = temp_path("roundtrip");
    let mut rec = Recorder::new("table@conference.example.org", "alice");
    rec.record("alice", "[Hello] 0.31");
    rec.record("bob", "[Welcome] 0.31\n[CreateTray] as 1 at (0.00, 0.00)\n[Setlife] 20");
    rec.record("bob", "gg");

    rec.dump_to_file(&path).unwrap();
    let loaded = Recorder::read_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.room(), "table@conference.example.org");
    assert_eq!(loaded.player(), "alice");
    assert_eq!(loaded.entries(), rec.entries());
}

#[test]
fn test_read_missing_file_returns_io_error() {
    let err = Recorder::read_from_file(temp_path("does-not-exist")).unwrap_err();
    assert!(matches!(err, ReplayError::Io(_)));
}

#[test]
fn test_read_plain_text_file_returns_io_error() {
    let path = temp_path("plain");
    std::fs::write(&path, "progenitus replay file\nroom: r\nplayer: p\n").unwrap();
    let result = Recorder::read_from_file(&path);
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(ReplayError::Io(_))));
}

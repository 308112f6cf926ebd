//! Audibility Integration Tests
//!
//! Tests for the hearing reconstruction through the collection API.

use logbuddy::{BatchOptions, Category, HearingRange, LogCollection};

fn say(second: u32, ckey: &str, x: i32, y: i32, z: i32) -> String {
    format!(
        r#"[2022-01-01 10:00:{:02}] SAY: {}/({}) "hi" (Hall ({},{},{}))"#,
        second, ckey, ckey, x, y, z
    )
}

fn heard_keys(logs: &LogCollection, ckey: &str, hearing: &HearingRange) -> Vec<String> {
    logs.heard_by(ckey, hearing, None)
        .unwrap()
        .into_iter()
        .filter_map(|e| e.actor().and_then(|a| a.normalized_ckey()))
        .collect()
}

#[test]
fn test_hearing_box_boundary() {
    let hearing = HearingRange::default();
    let range = hearing.effective();
    let lines = vec![
        say(0, "me", 100, 100, 2),
        say(1, "me", 100, 100, 2),
        say(2, "edge", 100 + range, 100, 2),
        say(3, "inside", 100 + range - 1, 100 - range + 1, 2),
    ];
    let logs = LogCollection::parse_batch(&lines, &BatchOptions::default());

    assert_eq!(heard_keys(&logs, "me", &hearing), ["me", "me", "inside"]);
}

#[test]
fn test_configured_range() {
    let hearing = HearingRange {
        range: 1,
        walking_error: 0,
    };
    let lines = vec![
        say(0, "me", 10, 10, 2),
        say(1, "me", 10, 10, 2),
        say(2, "close", 11, 10, 2),
    ];
    let logs = LogCollection::parse_batch(&lines, &BatchOptions::default());
    assert_eq!(heard_keys(&logs, "me", &hearing), ["me", "me"]);
}

#[test]
fn test_broadcast_and_allow_list() {
    let mut lines = vec![say(0, "me", 10, 10, 2), say(1, "me", 10, 10, 2)];
    lines.push("[2022-01-01 10:00:02] TCOMMS: Security: all units to the bar".to_string());
    lines.push(r#"[2022-01-01 10:00:03] EMOTE: other/(Other) nods. (Hall (11,10,2))"#.to_string());
    let mut logs = LogCollection::parse_batch(&lines, &BatchOptions::default());
    let hearing = HearingRange::default();

    assert_eq!(logs.heard_by("me", &hearing, None).unwrap().len(), 4);

    let kept = logs
        .filter_heard("me", &hearing, Some(&[Category::Say, Category::Tcomms]))
        .unwrap();
    assert_eq!(kept, 3);
    assert!(logs.entries().all(|e| e.category() != Category::Emote));
}

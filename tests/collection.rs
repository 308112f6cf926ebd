//! Collection Integration Tests
//!
//! Tests for batch construction, collation and the filter invariants.

use std::collections::BTreeSet;

use logbuddy::{BatchOptions, CollectionError, HearingRange, LogCollection};

const ROUND: &[&str] = &[
    r#"[2022-01-01 10:00:05] SAY: bob/(Bob) "anyone at the bar?" (Bar (12,10,2))"#,
    r#"[2022-01-01 10:00:00] SAY: alice/(Alice) "Hello" (Bar (10,10,2))"#,
    "[2022-01-01 10:00:03] GAME: The shuttle has been called",
    "[2022-01-01 10:00:07] ATTACK: carol[DC]/(Carol) has punched bob/(Bob)",
    r#"[2022-01-01 10:00:09] EMOTE: dave/(Dave) waves. (Medbay (80,80,2))"#,
];

fn parse(lines: &[&str]) -> LogCollection {
    LogCollection::parse_batch(lines.iter().copied(), &BatchOptions::default())
}

fn raw_set(logs: &LogCollection) -> BTreeSet<String> {
    logs.all_entries()
        .iter()
        .map(|e| e.raw_line().to_string())
        .collect()
}

fn is_sorted(logs: &LogCollection) -> bool {
    logs.all_entries()
        .windows(2)
        .all(|pair| pair[0].timestamp() <= pair[1].timestamp())
}

#[test]
fn test_banner_say_attack_scenario() {
    let logs = parse(&[
        "Starting up round ID 1337.",
        "-------------------------",
        r#"[2022-01-01 10:00:02] SAY: alice/(Alice) "Hello" (Bar (10,10,2))"#,
        "[2022-01-01 10:00:01] ATTACK: bob/(Bob) has punched alice/(Alice)",
    ]);

    assert_eq!(logs.round_id(), Some(1337));
    assert_eq!(logs.len(), 2);
    assert!(is_sorted(&logs));
    assert_eq!(
        logs.known_identities().iter().collect::<Vec<_>>(),
        ["alice", "bob"]
    );
    assert!(logs.entries().next().unwrap().location().is_none());
}

#[test]
fn test_export_round_trip() {
    let mut lines = ROUND.to_vec();
    lines.push("not a log line");
    let logs = parse(&lines);
    assert_eq!(logs.rejected().len(), 1);

    let mut out = Vec::new();
    logs.export(&mut out).unwrap();
    let exported = String::from_utf8(out).unwrap();
    let exported: Vec<&str> = exported.lines().collect();

    let mut expected = ROUND.to_vec();
    expected.sort_by_key(|line| &line[1..20]);
    assert_eq!(&exported[..ROUND.len()], expected.as_slice());
    assert!(exported[ROUND.len()].starts_with("Created using logbuddy v"));
}

#[test]
fn test_merge_is_associative_on_membership() {
    let a = parse(&ROUND[..2]);
    let b = parse(&ROUND[2..4]);
    let c = parse(&ROUND[4..]);

    let mut right = b.clone();
    right.merge(c.clone());
    let mut left_nested = a.clone();
    left_nested.merge(right);

    let mut left = a;
    left.merge(b);
    left.merge(c);

    assert_eq!(raw_set(&left_nested), raw_set(&left));
    assert!(is_sorted(&left));
    assert_eq!(left.len(), ROUND.len());
    assert_eq!(left.known_identities().len(), 4);
}

#[test]
fn test_merge_keeps_left_round_id() {
    let mut left = parse(&["Starting up round ID 1.", "---", ROUND[0]]);
    let right = parse(&["Starting up round ID 2.", "---", ROUND[1]]);
    left.merge(right);
    assert_eq!(left.round_id(), Some(1));
    assert_eq!(left.len(), 2);
}

#[test]
fn test_filters_never_grow_the_view() {
    let mut logs = parse(ROUND);
    let hearing = HearingRange::default();

    let mut previous = logs.len();
    logs.filter_strings(&["bar", "punched", "waves"], false).unwrap();
    assert!(logs.len() <= previous);
    previous = logs.len();

    logs.filter_heard("bob", &hearing, None).unwrap();
    assert!(logs.len() <= previous);

    let all = raw_set(&logs);
    assert!(logs.entries().all(|e| all.contains(e.raw_line())));
}

#[test]
fn test_idempotent_filters() {
    let mut logs = parse(ROUND);
    logs.filter_ckeys(&["alice", "bob"]).unwrap();
    let before: Vec<String> = logs.entries().map(|e| e.raw_line().to_string()).collect();

    logs.filter_ckeys(&["alice", "bob"]).unwrap();
    let after: Vec<String> = logs.entries().map(|e| e.raw_line().to_string()).collect();
    assert_eq!(before, after);

    logs.reset();
    logs.reset();
    assert_eq!(logs.len(), ROUND.len());
}

#[test]
fn test_empty_result_is_rejected() {
    let mut logs = parse(ROUND);
    logs.filter_location_name("bar").unwrap();
    assert_eq!(logs.len(), 2);

    let err = logs.filter_strings(&["medbay"], false).unwrap_err();
    assert!(matches!(err, CollectionError::EmptyResultRejected { .. }));
    assert_eq!(logs.len(), 2);
}

#[test]
fn test_conversation_between_two_players() {
    let mut logs = parse(ROUND);
    let kept = logs
        .filter_conversation(&["alice", "bob"], &HearingRange::default())
        .unwrap();
    // Carol's attack is acted by carol, so it is not part of the participants' lines
    assert_eq!(kept, 2);
    assert!(logs.entries().all(|e| e.category() == logbuddy::Category::Say));
}

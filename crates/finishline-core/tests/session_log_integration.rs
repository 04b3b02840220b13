//! Integration tests for the session log.
//!
//! Covers the full path from raw front-end events to persisted lines and
//! back into window summaries, plus corruption tolerance and concurrent use.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, TimeZone, Utc};
use finishline_core::session::{format_timestamp, COLUMNS};
use finishline_core::{EndReason, InsightsBackend, SessionLog, SessionMode};
use serde_json::json;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap()
}

fn header_line() -> String {
    COLUMNS.join(",")
}

#[test]
fn test_end_to_end_summary() {
    let dir = tempfile::tempdir().unwrap();
    let backend = InsightsBackend::new(Arc::new(SessionLog::new(dir.path().join("sessions.csv"))));

    backend
        .record_session_at(
            &json!({
                "plannedSeconds": 1500,
                "actualSeconds": 1500,
                "mode": "focus",
                "reason": "completed",
                "cycleIndex": 1
            }),
            now(),
        )
        .unwrap();
    backend
        .record_session_at(
            &json!({
                "plannedSeconds": 600,
                "actualSeconds": 200,
                "mode": "shortBreak",
                "reason": "skipped",
                "wasSkipped": true
            }),
            now(),
        )
        .unwrap();

    let summary = backend.get_summary_at(now()).unwrap();
    let all = &summary.all_time;
    assert_eq!(all.total_sessions, 2);
    assert_eq!(all.completed_sessions, 1);
    assert_eq!(all.completion_rate, 0.5);
    assert_eq!(all.focus_actual_seconds, 1500);
    assert_eq!(all.unfinished_seconds, 400);
    assert_eq!(all.streak_days, 1);
    assert_eq!(summary.seven_day.total_sessions, 2);
    assert_eq!(summary.thirty_day.total_sessions, 2);
    assert!(summary.storage_path.ends_with("sessions.csv"));
    assert_eq!(summary.last_updated_at, "2024-06-15T18:00:00.000Z");
}

#[test]
fn test_persisted_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.csv");
    let log = SessionLog::new(&path);

    let raw = finishline_core::RawSessionEvent::from_payload(&json!({
        "sessionId": "id, with \"quotes\"",
        "startedAt": "2024-06-15T09:00:00Z",
        "endedAt": "2024-06-15T09:10:00Z",
        "mode": "focus",
        "plannedSeconds": 1500,
        "actualSeconds": 600,
        "reason": "reset",
        "cycleIndex": 2
    }));
    log.append_session(&raw, now()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], header_line());
    assert_eq!(
        lines[1],
        "\"id, with \"\"quotes\"\"\",2024-06-15T09:00:00.000Z,2024-06-15T09:10:00.000Z,focus,1500,600,0.4000,false,false,2,reset"
    );
    assert!(text.ends_with('\n'));

    let records = log.read_all_records().unwrap();
    assert_eq!(records[0].session_id, "id, with \"quotes\"");
}

#[test]
fn test_idempotent_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.csv");

    let log = SessionLog::new(&path);
    for _ in 0..5 {
        log.initialize().unwrap();
    }
    log.append_session(
        &finishline_core::RawSessionEvent::from_payload(
            &json!({"plannedSeconds": 60, "actualSeconds": 60, "reason": "completed"}),
        ),
        now(),
    )
    .unwrap();

    // A second log instance over the same file must not add another header.
    let reopened = SessionLog::new(&path);
    for _ in 0..3 {
        reopened.initialize().unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches(&header_line()).count(), 1);
    assert_eq!(reopened.read_all_records().unwrap().len(), 1);
}

#[test]
fn test_concurrent_initialization_creates_one_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/sessions.csv");
    let log = Arc::new(SessionLog::new(&path));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let log = Arc::clone(&log);
            thread::spawn(move || log.initialize().unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, format!("{}\n", header_line()));
}

#[test]
fn test_concurrent_appends_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(SessionLog::new(dir.path().join("sessions.csv")));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for i in 0..25 {
                    let raw = finishline_core::RawSessionEvent::from_payload(&json!({
                        "sessionId": format!("t{t}-{i}"),
                        "plannedSeconds": 1500,
                        "actualSeconds": 100 + i,
                        "reason": "reset"
                    }));
                    log.append_session(&raw, now()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = log.read_all_records().unwrap();
    assert_eq!(records.len(), 100);

    // Per-thread submission order survives.
    for t in 0..4 {
        let ids: Vec<&str> = records
            .iter()
            .map(|r| r.session_id.as_str())
            .filter(|id| id.starts_with(&format!("t{t}-")))
            .collect();
        let expected: Vec<String> = (0..25).map(|i| format!("t{t}-{i}")).collect();
        assert_eq!(ids, expected);
    }
}

#[test]
fn test_corruption_tolerance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.csv");
    std::fs::write(
        &path,
        format!(
            "{}\n{}\n{}\n",
            header_line(),
            "ok,2024-06-15T09:00:00.000Z,2024-06-15T09:25:00.000Z,focus,1500,1500,1.0000,true,false,1,completed",
            "short,2024-06-15T10:00:00.000Z,2024-06-15T10:25:00.000Z,focus,1500,1500,1.0000,true"
        ),
    )
    .unwrap();

    let log = SessionLog::new(&path);
    let records = log.read_all_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session_id, "ok");
}

#[test]
fn test_truncated_tail_and_garbage_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.csv");
    let mut bytes = format!(
        "{}\n{}\n{}\n",
        header_line(),
        "a,2024-06-14T09:00:00.000Z,2024-06-14T09:25:00.000Z,focus,1500,1500,1.0000,true,false,1,completed",
        "b,2024-06-15T09:00:00.000Z,2024-06-15T09:25:00.000Z,focus,NaN,1500,1.0000,true,false,1,completed",
    )
    .into_bytes();
    bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
    bytes.extend_from_slice(b"c,2024-06-15T10:00:00.000Z,2024-06-15T10");
    std::fs::write(&path, bytes).unwrap();

    let records = SessionLog::new(&path).read_all_records().unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.session_id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
}

#[test]
fn test_embedded_newline_survives_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path().join("sessions.csv"));
    let raw = finishline_core::RawSessionEvent::from_payload(&json!({
        "sessionId": "first line\nsecond line",
        "plannedSeconds": 300,
        "actualSeconds": 300,
        "mode": "longBreak",
        "reason": "completed"
    }));
    log.append_session(&raw, now()).unwrap();

    let records = log.read_all_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session_id, "first line\nsecond line");
    assert_eq!(records[0].mode, SessionMode::LongBreak);
}

#[test]
fn test_records_keep_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path().join("sessions.csv"));
    let reasons = ["completed", "skipped", "reset", "reconfigured", "abandoned"];
    for (i, reason) in reasons.iter().enumerate() {
        let ended = now() - Duration::days(i as i64);
        let raw = finishline_core::RawSessionEvent::from_payload(&json!({
            "sessionId": format!("s{i}"),
            "endedAt": format_timestamp(ended),
            "plannedSeconds": 1500,
            "actualSeconds": 300,
            "reason": reason
        }));
        log.append_session(&raw, now()).unwrap();
    }

    let records = log.read_all_records().unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.session_id.as_str()).collect();
    assert_eq!(ids, vec!["s0", "s1", "s2", "s3", "s4"]);
    assert_eq!(records[0].reason, EndReason::Completed);
    assert!(records[0].completed);
    assert_eq!(records[4].reason, EndReason::Abandoned);
}

#[test]
fn test_streak_scenarios_through_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path().join("sessions.csv"));
    let focus_on = |days_ago: i64| {
        finishline_core::RawSessionEvent::from_payload(&json!({
            "endedAt": format_timestamp(now() - Duration::days(days_ago)),
            "plannedSeconds": 1500,
            "actualSeconds": 1500,
            "mode": "focus",
            "reason": "completed"
        }))
    };

    assert_eq!(log.summary(now()).unwrap().all_time.streak_days, 0);

    log.append_session(&focus_on(1), now()).unwrap();
    assert_eq!(log.summary(now()).unwrap().all_time.streak_days, 1);

    log.append_session(&focus_on(0), now()).unwrap();
    log.append_session(&focus_on(2), now()).unwrap();
    log.append_session(&focus_on(4), now()).unwrap();
    assert_eq!(log.summary(now()).unwrap().all_time.streak_days, 3);
}

fn append_raw_line(path: &std::path::Path, line: &str) {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(line.as_bytes()).unwrap();
}

#[test]
fn test_stray_quote_line_does_not_hide_later_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.csv");
    let backend = InsightsBackend::new(Arc::new(SessionLog::new(&path)));
    backend.log().initialize().unwrap();
    append_raw_line(&path, "\"id, trunc\n");

    for _ in 0..3 {
        backend
            .record_session_at(
                &json!({"plannedSeconds": 1500, "actualSeconds": 1500, "reason": "completed"}),
                now(),
            )
            .unwrap();
    }

    assert_eq!(backend.log().read_all_records().unwrap().len(), 3);
    assert_eq!(backend.get_summary_at(now()).unwrap().all_time.total_sessions, 3);
}

#[test]
fn test_mid_file_corruption_between_quoted_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.csv");
    let log = SessionLog::new(&path);
    let quoted = |id: &str| {
        finishline_core::RawSessionEvent::from_payload(&json!({
            "sessionId": id,
            "plannedSeconds": 600,
            "actualSeconds": 300,
            "reason": "reset"
        }))
    };

    log.append_session(&quoted("before, \"quoted\""), now()).unwrap();
    append_raw_line(
        &path,
        "\"half written,2024-06-15T09:00:00.000Z,2024-06-15T09:2\n",
    );
    log.append_session(&quoted("after, one"), now()).unwrap();
    append_raw_line(&path, "short,row\n");
    log.append_session(&quoted("after\ntwo"), now()).unwrap();

    let records = log.read_all_records().unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.session_id.as_str()).collect();
    assert_eq!(ids, vec!["before, \"quoted\"", "after, one", "after\ntwo"]);
}

#[test]
fn test_huge_planned_seconds_keep_summary_available() {
    let dir = tempfile::tempdir().unwrap();
    let backend = InsightsBackend::new(Arc::new(SessionLog::new(dir.path().join("sessions.csv"))));
    for _ in 0..2 {
        backend
            .record_session_at(
                &json!({"plannedSeconds": 1e30, "actualSeconds": 10, "reason": "reset"}),
                now(),
            )
            .unwrap();
    }

    let summary = backend.get_summary_at(now()).unwrap();
    assert_eq!(summary.all_time.total_sessions, 2);
    assert_eq!(summary.all_time.total_planned_seconds, u64::MAX);
    assert_eq!(summary.all_time.total_actual_seconds, 20);
    assert!(summary.all_time.finish_pressure_score <= 100);
}

#[test]
fn test_payload_with_both_key_spellings_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let backend = InsightsBackend::new(Arc::new(SessionLog::new(dir.path().join("sessions.csv"))));
    let record = backend
        .record_session_at(
            &json!({
                "sessionId": "a",
                "session_id": "a",
                "plannedSeconds": 1500,
                "actualSeconds": 1500,
                "mode": "focus",
                "reason": "completed"
            }),
            now(),
        )
        .unwrap()
        .expect("completed focus stage is persisted");
    assert_eq!(record.session_id, "a");
    assert_eq!(record.planned_seconds, 1500);
    assert_eq!(record.reason, EndReason::Completed);
    assert_eq!(backend.log().read_all_records().unwrap().len(), 1);
}

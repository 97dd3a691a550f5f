use super::message::{Delivery, Line};
use super::{join_subscribers, pump, spawn_subscribers};
use crate::broadcast::Broadcaster;
use crate::utils::error::{BroadcastError, RelayError};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::thread;

#[test]
fn test_line_new_sets_timestamp() {
    let line = Line::new(3, "hello".to_string());
    assert_eq!(line.seq, 3);
    assert_eq!(line.payload, "hello");
    assert!(line.timestamp > 0);
}

#[test]
fn test_pump_without_subscribers() {
    let broadcaster = Broadcaster::new();
    let sent = pump(&broadcaster, Cursor::new("one\ntwo\nthree\n")).unwrap();
    assert_eq!(sent, 3);
}

#[test]
fn test_relay_fans_out_every_line() {
    let broadcaster = Broadcaster::new();
    let sink = Arc::new(Mutex::new(Vec::<u8>::new()));
    let handles = spawn_subscribers(&broadcaster, 3, Arc::clone(&sink)).unwrap();
    assert_eq!(broadcaster.subscriber_count(), 3);

    let sent = pump(&broadcaster, Cursor::new("first\r\nsecond\n")).unwrap();
    assert_eq!(sent, 2);

    broadcaster.close();
    assert_eq!(join_subscribers(handles), 6);

    let output = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
    let mut per_subscriber: HashMap<u64, Vec<Line>> = HashMap::new();
    for record in output.lines() {
        let delivery: Delivery = serde_json::from_str(record).unwrap();
        per_subscriber
            .entry(delivery.subscriber)
            .or_default()
            .push(delivery.line);
    }

    assert_eq!(per_subscriber.len(), 3);
    for lines in per_subscriber.values() {
        let payloads: Vec<_> = lines.iter().map(|l| l.payload.as_str()).collect();
        let seqs: Vec<_> = lines.iter().map(|l| l.seq).collect();
        assert_eq!(payloads, vec!["first", "second"]);
        assert_eq!(seqs, vec![0, 1]);
    }
}

#[test]
fn test_pump_after_close() {
    let broadcaster = Broadcaster::new();
    broadcaster.close();

    let err = pump(&broadcaster, Cursor::new("late\n")).unwrap_err();
    assert!(matches!(err, RelayError::Broadcast(BroadcastError::Closed)));
}

#[test]
fn test_pump_empty_input_after_close() {
    let broadcaster = Broadcaster::new();
    broadcaster.close();

    assert_eq!(pump(&broadcaster, Cursor::new("")).unwrap(), 0);
}

#[test]
fn test_spawn_subscribers_after_close() {
    let broadcaster = Broadcaster::<Line>::new();
    broadcaster.close();

    let sink = Arc::new(Mutex::new(Vec::<u8>::new()));
    let err = spawn_subscribers(&broadcaster, 2, sink).unwrap_err();
    assert_eq!(err, BroadcastError::Closed);
}

#[test]
fn test_join_subscribers_counts_panicked_thread_as_zero() {
    let handles = vec![
        thread::spawn(|| 3),
        thread::spawn(|| -> u64 { panic!("subscriber failed") }),
        thread::spawn(|| 4),
    ];
    assert_eq!(join_subscribers(handles), 7);
}

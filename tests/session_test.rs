//! End-to-end session tests: scripted source -> controller -> host callback

use serde_json::json;
use std::sync::{Arc, Mutex};
use voicenav::command::{CommandEvent, PhraseTable};
use voicenav::session::SessionController;
use voicenav::source::{ScriptedSource, SourceError, SourceEvent};

fn scripted_session(
    script: Vec<SourceEvent>,
    phrases: PhraseTable,
) -> (SessionController, Arc<Mutex<Vec<CommandEvent>>>) {
    let (tx, rx) = flume::unbounded();
    let source = ScriptedSource::new(script, tx);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let controller = SessionController::new(
        Some(Box::new(source)),
        rx,
        phrases,
        Box::new(move |event| sink.lock().unwrap().push(event)),
    );
    (controller, seen)
}

#[test]
fn full_session_resolves_each_utterance_once() {
    let mut table = PhraseTable::new();
    table.insert("go to section", json!({"action": "gotoSection"}));

    let (mut controller, seen) = scripted_session(
        vec![
            SourceEvent::Transcript("please go to section three".into()),
            SourceEvent::Error(SourceError::Runtime("network glitch".into())),
            SourceEvent::Transcript("please go back now".into()),
            SourceEvent::Transcript("banana sandwich".into()),
        ],
        table,
    );
    let state = controller.state();
    assert!(state.is_supported());

    controller.start();
    assert!(state.is_listening());
    controller.run();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);

    assert_eq!(seen[0].command, "go to section");
    assert_eq!(seen[0].phrase, "please go to section three");
    assert_eq!(seen[0].meta, Some(json!({"action": "gotoSection"})));

    assert_eq!(seen[1].command, "previous");
    assert_eq!(seen[1].meta, None);

    assert_eq!(seen[2].command, "unknown");

    // recognition ran out of script: listening flipped off on its own
    assert!(!state.is_listening());
    assert_eq!(state.last_transcript(), Some("banana sandwich".to_string()));
}

#[test]
fn spontaneous_end_flips_listening_off() {
    let (mut controller, seen) = scripted_session(vec![], PhraseTable::new());
    let state = controller.state();

    controller.start();
    assert!(state.is_listening());
    controller.run();

    assert!(!state.is_listening());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn duplicate_start_is_a_noop() {
    let (mut controller, seen) = scripted_session(
        vec![SourceEvent::Transcript("next".into())],
        PhraseTable::new(),
    );
    let state = controller.state();

    controller.start();
    controller.start();
    assert!(state.is_listening());
    controller.run();

    // the transcript was still delivered exactly once
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn stop_is_always_safe() {
    let (mut controller, _seen) = scripted_session(vec![], PhraseTable::new());
    let state = controller.state();

    // stop before start: warned, not fatal
    controller.stop();
    assert!(!state.is_listening());

    controller.start();
    controller.stop();
    assert!(!state.is_listening());

    // the source emitted End for the stop, so run returns promptly
    controller.run();
}

#[test]
fn stopped_session_keeps_already_queued_transcripts() {
    // Events that were queued before run() still resolve: cancellation is
    // cooperative, not a purge.
    let (tx, rx) = flume::unbounded();
    tx.send(SourceEvent::Transcript("open the door".into()))
        .unwrap();
    tx.send(SourceEvent::End).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut controller = SessionController::new(
        None,
        rx,
        PhraseTable::new(),
        Box::new(move |event| sink.lock().unwrap().push(event)),
    );
    controller.run();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].command, "open");
}

//! End-to-end tests: transport bytes in, sealed conversation out.

use crossbeam_channel::{unbounded, Receiver, Sender};
use fadestream::{
    chunk, consume_stream, ConsumerConfig, Conversation, ConversationError, EndReason, NoticePolicy,
    ReadTransport, RenderUnit, ScriptedTransport, Snapshot, StreamConsumer, StreamStatus, Transport,
    TransportError, TurnOutcome,
};
use std::io::{Cursor, ErrorKind};
use std::ops::ControlFlow;
use std::time::Duration;

const HI_THERE: &[&str] = &[
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hi",
    " there\"}}]}\n",
    "data: [DONE]\n",
];

fn delta_line(text: &str) -> String {
    let frame = serde_json::json!({"choices": [{"delta": {"content": text}}]});
    format!("data: {frame}\n")
}

/// Run one turn to completion, collecting every snapshot.
fn run_turn<T: Transport>(transport: T, config: &ConsumerConfig) -> (Conversation, Vec<Snapshot>, TurnOutcome) {
    let mut conversation = Conversation::new();
    let turn = conversation.submit("Hello").unwrap();
    let mut snapshots = Vec::new();
    let outcome = consume_stream(transport, turn, config, &mut |snapshot: Snapshot| {
        snapshots.push(snapshot);
        ControlFlow::Continue(())
    });
    conversation.seal(outcome.clone()).unwrap();
    (conversation, snapshots, outcome)
}

#[test]
fn test_hi_there_at_every_split() {
    let body = HI_THERE.concat().into_bytes();
    let expected = vec![RenderUnit::word("Hi"), RenderUnit::space(), RenderUnit::word("there")];

    for first in 0..=body.len() {
        for second in first..=body.len() {
            let transport = ScriptedTransport::from_chunks([
                body[..first].to_vec(),
                body[first..second].to_vec(),
                body[second..].to_vec(),
            ]);
            let (conversation, snapshots, outcome) = run_turn(transport, &ConsumerConfig::default());

            assert_eq!(outcome.content, "Hi there", "split at {first}/{second}");
            assert_eq!(outcome.status, StreamStatus::Completed(EndReason::Done));
            let last = snapshots.last().unwrap();
            assert_eq!(last.units, expected);
            assert!(!last.is_active());
            assert_eq!(conversation.messages()[1].content, "Hi there");
            assert!(!conversation.is_busy());
        }
    }
}

#[test]
fn test_spec_chunks_as_delivered() {
    let transport = ScriptedTransport::from_chunks(HI_THERE.iter().copied());
    let (_, snapshots, outcome) = run_turn(transport, &ConsumerConfig::default());

    assert_eq!(outcome.content, "Hi there");
    // One delta, then the final snapshot.
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots[0].is_active());
    assert_eq!(snapshots[0].units, chunk("Hi there"));
}

#[test]
fn test_reader_transport_end_to_end() {
    let mut body = String::from(": keep-alive\n\nevent: ping\n\n");
    for piece in ["Hel", "lo, ", "wörld", "\n\nBye"] {
        body.push_str(&delta_line(piece));
        body.push('\n');
    }
    body.push_str("data: \"[DONE]\"\r\n\r\n");
    body.push_str(&delta_line("ignored after done"));

    let transport = ReadTransport::with_chunk_size(Cursor::new(body.into_bytes()), 5);
    let (_, snapshots, outcome) = run_turn(transport, &ConsumerConfig::default());

    assert_eq!(outcome.content, "Hello, wörld\n\nBye");
    assert_eq!(outcome.status, StreamStatus::Completed(EndReason::Done));
    let contents: Vec<&str> = snapshots.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["Hel", "Hello, ", "Hello, wörld", "Hello, wörld\n\nBye", "Hello, wörld\n\nBye"]
    );
}

#[test]
fn test_abrupt_end_keeps_content() {
    let transport = ScriptedTransport::new().chunk(delta_line("partial answer"));
    let (conversation, _, outcome) = run_turn(transport, &ConsumerConfig::default());

    assert_eq!(outcome.content, "partial answer");
    assert_eq!(outcome.status, StreamStatus::Completed(EndReason::TransportEnded));
    assert!(!conversation.messages()[1].is_streaming());
}

#[test]
fn test_transport_failure_shows_notice() {
    let config = ConsumerConfig {
        error_notice: "Sorry, the reply was interrupted.".to_string(),
        ..ConsumerConfig::default()
    };
    let transport = ScriptedTransport::new()
        .chunk(delta_line("Half an ans"))
        .fail(TransportError::Io(std::io::Error::new(ErrorKind::ConnectionReset, "reset")));
    let (conversation, snapshots, outcome) = run_turn(transport, &config);

    assert_eq!(outcome.content, "Sorry, the reply was interrupted.");
    assert!(outcome.status.is_failed());
    assert_eq!(snapshots.last().unwrap().content, outcome.content);
    assert!(conversation.messages()[1].status.is_failed());
}

#[test]
fn test_transport_failure_when_empty_policy_keeps_content() {
    let config = ConsumerConfig {
        notice_policy: NoticePolicy::WhenEmpty,
        ..ConsumerConfig::default()
    };
    let transport = ScriptedTransport::new()
        .chunk(delta_line("kept"))
        .fail(TransportError::Closed);
    let (_, _, outcome) = run_turn(transport, &config);
    assert_eq!(outcome.content, "kept");
    assert!(outcome.status.is_failed());
}

#[test]
fn test_protocol_violation_ends_empty() {
    let transport = ScriptedTransport::from_chunks(["HTTP/1.1 garbage\n", "{\"not\": \"sse\"}\n"]);
    let (_, _, outcome) = run_turn(transport, &ConsumerConfig::default());
    assert_eq!(outcome.content, "");
    assert_eq!(outcome.status, StreamStatus::Completed(EndReason::TransportEnded));
}

#[test]
fn test_malformed_frame_is_skipped() {
    let body = format!("{}data: {{not json\n{}data: [DONE]\n", delta_line("a"), delta_line("b"));
    let (_, _, outcome) = run_turn(ScriptedTransport::split_every(body.as_bytes(), 3), &ConsumerConfig::default());
    assert_eq!(outcome.content, "ab");
}

/// Transport fed by the test through a channel; blocks until data arrives.
struct GatedTransport {
    chunks: Receiver<Vec<u8>>,
}

impl Transport for GatedTransport {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.chunks.recv().ok())
    }
}

fn gated() -> (Sender<Vec<u8>>, GatedTransport) {
    let (tx, rx) = unbounded();
    (tx, GatedTransport { chunks: rx })
}

#[test]
fn test_busy_guard_during_stream() {
    let mut conversation = Conversation::new();
    let turn = conversation.submit("first").unwrap();
    let (tx, transport) = gated();
    let consumer = StreamConsumer::spawn(transport, turn, ConsumerConfig::default()).unwrap();

    tx.send(delta_line("streaming").into_bytes()).unwrap();
    let snapshot = consumer.receiver().recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(conversation.apply(snapshot.message_id, &snapshot.content));

    assert_eq!(conversation.submit("second").unwrap_err(), ConversationError::Busy);
    assert_eq!(conversation.messages().len(), 2);

    tx.send(b"data: [DONE]\n".to_vec()).unwrap();
    conversation.seal(consumer.join()).unwrap();
    assert!(!conversation.is_busy());
    assert!(conversation.submit("second").is_ok());
}

#[test]
fn test_cancel_keeps_partial_content() {
    let mut conversation = Conversation::new();
    let turn = conversation.submit("tell me a story").unwrap();
    let (tx, transport) = gated();
    let consumer = StreamConsumer::spawn(transport, turn, ConsumerConfig::default()).unwrap();

    tx.send(delta_line("Once upon").into_bytes()).unwrap();
    let snapshot = consumer.receiver().recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(snapshot.content, "Once upon");

    consumer.cancel();
    tx.send(delta_line(" a time").into_bytes()).unwrap();
    drop(tx);

    let outcome = consumer.join();
    assert_eq!(outcome.content, "Once upon");
    assert_eq!(outcome.status, StreamStatus::Completed(EndReason::Cancelled));
    conversation.seal(outcome).unwrap();
    assert_eq!(conversation.messages()[1].content, "Once upon");
}

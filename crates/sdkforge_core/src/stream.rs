//! Classification of progress-stream payloads.

/// Keep-alive payload sent by the backend when no log line arrived recently.
pub const HEARTBEAT: &str = "ping";
pub const DONE_SENTINEL: &str = "DONE";
pub const FAILED_SENTINEL: &str = "FAILED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTerminal {
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    Heartbeat,
    Terminal(StreamTerminal),
    Line(String),
}

/// Why a progress stream stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    Terminal(StreamTerminal),
    /// The server closed the connection without a sentinel.
    Disconnected,
    Error(String),
}

pub fn classify(payload: &str) -> StreamMessage {
    let trimmed = payload.trim_end_matches(['\r', '\n']);
    match trimmed {
        HEARTBEAT => StreamMessage::Heartbeat,
        DONE_SENTINEL => StreamMessage::Terminal(StreamTerminal::Done),
        FAILED_SENTINEL => StreamMessage::Terminal(StreamTerminal::Failed),
        line => StreamMessage::Line(line.to_string()),
    }
}

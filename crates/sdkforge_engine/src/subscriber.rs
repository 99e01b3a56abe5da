use std::sync::{mpsc, Arc};

use forge_logging::{forge_debug, forge_warn};
use futures_util::StreamExt;
use sdkforge_core::stream::classify;
use sdkforge_core::{JobId, StreamEnd, StreamMessage, Ticket};
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::EngineEvent;

/// Relays progress lines for one job until a sentinel, a disconnect, or cancellation.
///
/// Heartbeats are swallowed. A cancelled subscriber reports nothing.
pub(crate) async fn run_subscriber(
    backend: Arc<dyn Backend>,
    ticket: Ticket,
    job_id: JobId,
    cancel: CancellationToken,
    events: mpsc::Sender<EngineEvent>,
) {
    let opened = tokio::select! {
        _ = cancel.cancelled() => return,
        opened = backend.subscribe(&job_id) => opened,
    };
    let mut lines = match opened {
        Ok(lines) => lines,
        Err(err) => {
            forge_warn!("progress stream for {} unavailable: {}", job_id, err);
            let _ = events.send(EngineEvent::StreamClosed {
                ticket,
                end: StreamEnd::Error(err.to_string()),
            });
            return;
        }
    };

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = lines.next() => next,
        };
        let end = match next {
            Some(Ok(payload)) => match classify(&payload) {
                StreamMessage::Heartbeat => continue,
                StreamMessage::Line(line) => {
                    if events.send(EngineEvent::StreamLine { ticket, line }).is_err() {
                        return;
                    }
                    continue;
                }
                StreamMessage::Terminal(terminal) => StreamEnd::Terminal(terminal),
            },
            Some(Err(err)) => StreamEnd::Error(err.to_string()),
            None => StreamEnd::Disconnected,
        };
        forge_debug!("progress stream for {} closed: {:?}", job_id, end);
        let _ = events.send(EngineEvent::StreamClosed { ticket, end });
        return;
    }
}

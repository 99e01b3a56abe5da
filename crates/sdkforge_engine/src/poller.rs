use std::sync::{mpsc, Arc};
use std::time::Duration;

use forge_logging::{forge_debug, forge_info};
use sdkforge_core::{JobId, Ticket};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::EngineEvent;

/// Asks for the job status every `period` until the job is terminal, a poll
/// fails, or `cancel` fires.
///
/// Polls run one at a time; each result carries a sequence number so the
/// orchestrator can drop answers that arrive out of order anyway.
pub(crate) async fn run_poller(
    backend: Arc<dyn Backend>,
    ticket: Ticket,
    job_id: JobId,
    period: Duration,
    cancel: CancellationToken,
    events: mpsc::Sender<EngineEvent>,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interval.tick() => {}
        }

        seq += 1;
        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = backend.status(&job_id) => result,
        };
        let finished = match &result {
            Ok(job) => job.status.is_terminal(),
            Err(_) => true,
        };
        if let Ok(job) = &result {
            forge_debug!("poll {} {} -> {}", ticket, seq, job.status);
        }
        if events
            .send(EngineEvent::StatusPolled {
                ticket,
                seq,
                result,
            })
            .is_err()
        {
            return;
        }
        if finished {
            forge_info!("poller for {} ({}) finished after {} polls", job_id, ticket, seq);
            return;
        }
    }
}

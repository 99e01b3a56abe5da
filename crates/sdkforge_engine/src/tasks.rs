use sdkforge_core::Ticket;
use tokio_util::sync::CancellationToken;

/// A background task owned by one job ticket. Dropping the slot cancels the task.
#[derive(Debug)]
pub(crate) struct TaskSlot {
    ticket: Ticket,
    cancel: CancellationToken,
}

impl TaskSlot {
    pub fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            cancel: CancellationToken::new(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// At most one poller and one progress stream are alive at a time.
#[derive(Debug, Default)]
pub(crate) struct JobTasks {
    poller: Option<TaskSlot>,
    stream: Option<TaskSlot>,
}

impl JobTasks {
    /// Installs a new poller slot, cancelling the previous one.
    pub fn replace_poller(&mut self, ticket: Ticket) -> CancellationToken {
        let slot = TaskSlot::new(ticket);
        let token = slot.token();
        self.poller = Some(slot);
        token
    }

    pub fn replace_stream(&mut self, ticket: Ticket) -> CancellationToken {
        let slot = TaskSlot::new(ticket);
        let token = slot.token();
        self.stream = Some(slot);
        token
    }

    /// Stops the poller only if it still belongs to `ticket`.
    pub fn stop_poller(&mut self, ticket: Ticket) -> bool {
        if self.poller.as_ref().is_some_and(|slot| slot.ticket == ticket) {
            self.poller = None;
            return true;
        }
        false
    }

    pub fn cancel_all(&mut self) {
        self.poller = None;
        self.stream = None;
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.poller.is_none() && self.stream.is_none()
    }
}

use crate::types::ChangeRecord;
use tokio::sync::broadcast;

/// Process-wide fanout for committed changes. Records are published
/// after their transaction commits, never before.
#[derive(Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeRecord>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeRecord> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        change: ChangeRecord,
    ) -> Result<(), broadcast::error::SendError<ChangeRecord>> {
        self.sender.send(change).map(|_| ())
    }
}

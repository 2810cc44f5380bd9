//! Domain event emission.
//!
//! The loan subsystem announces request creations and decisions to whatever
//! notification or broadcast consumer is attached. Emission is
//! fire-and-forget: having no subscriber is a normal state, not an error.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::models::events::DomainEvent;

/// Seam between the state machine and notification consumers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: DomainEvent);
}

/// In-process broadcast bus backing the emitter seam
pub struct BroadcastEmitter {
    tx: broadcast::Sender<DomainEvent>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future domain events
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Stream adapter over a fresh subscription
    pub fn stream(&self) -> BroadcastStream<DomainEvent> {
        BroadcastStream::new(self.tx.subscribe())
    }
}

#[async_trait]
impl EventEmitter for BroadcastEmitter {
    async fn emit(&self, event: DomainEvent) {
        tracing::debug!(kind = event.kind(), "domain event emitted");
        // A send error only means nobody is listening right now
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::LoanRequestCreated;
    use crate::models::loan_request::{LoanRequestDetails, RequestStatus};
    use chrono::Utc;
    use tokio_stream::StreamExt;

    fn sample_event() -> DomainEvent {
        DomainEvent::LoanRequestCreated(LoanRequestCreated {
            request: LoanRequestDetails {
                id: 1,
                book_id: 2,
                book_title: "Dune".to_string(),
                requester_id: 3,
                requester_name: "Reader".to_string(),
                approver_id: None,
                campus_id: 1,
                status: RequestStatus::Pending,
                canceled_by_requester: false,
                decided_at: None,
                created_at: Utc::now(),
            },
        })
    }

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let emitter = BroadcastEmitter::new(8);
        let mut rx = emitter.subscribe();

        emitter.emit(sample_event()).await;

        let event = rx.recv().await.expect("event should be delivered");
        assert_eq!(event.kind(), "loan_request.created");
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_a_no_op() {
        let emitter = BroadcastEmitter::new(8);
        // Must not panic or error
        emitter.emit(sample_event()).await;
    }

    #[tokio::test]
    async fn stream_adapter_yields_events() {
        let emitter = BroadcastEmitter::new(8);
        let mut stream = emitter.stream();

        emitter.emit(sample_event()).await;

        let event = stream
            .next()
            .await
            .expect("stream should yield")
            .expect("no lag expected");
        assert_eq!(event.kind(), "loan_request.created");
    }
}

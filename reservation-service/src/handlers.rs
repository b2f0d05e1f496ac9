use anyhow::Result;
use futures::StreamExt;
use rdkafka::consumer::StreamConsumer;
use rdkafka::Message;
use tracing::{error, info, warn};
use crate::models::*;
use crate::repository::SharedRepository;

/// Turns every message on the input topic into a new reservation.
///
/// Delivery is at-most-once: a payload that cannot be decoded or stored is
/// logged and dropped, never retried.
pub struct ReservationProcessor {
    repository: SharedRepository,
}

impl ReservationProcessor {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }

    pub async fn run(&self, consumer: StreamConsumer) {
        let mut message_stream = consumer.stream();

        while let Some(message) = message_stream.next().await {
            match message {
                Ok(m) => {
                    if let Err(e) = self.handle_payload(m.payload()).await {
                        error!(
                            "Dropping message at {}/{}@{}: {}",
                            m.topic(),
                            m.partition(),
                            m.offset(),
                            e
                        );
                    }
                }
                Err(e) => error!("Error receiving message: {}", e),
            }
        }

        warn!("Input stream ended, listener stopped");
    }

    /// Returns `None` for a message without a payload.
    pub async fn handle_payload(&self, payload: Option<&[u8]>) -> Result<Option<Reservation>> {
        let Some(bytes) = payload else {
            warn!("Skipping message with empty payload");
            return Ok(None);
        };

        let name = std::str::from_utf8(bytes)?;
        let reservation = self.accept(name).await?;
        Ok(Some(reservation))
    }

    /// Stores the payload verbatim as a reservation name.
    pub async fn accept(&self, name: &str) -> Result<Reservation> {
        let reservation = self.repository.save(NewReservation::new(name)).await?;
        info!("Accepted new reservation: {}", reservation);
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryReservationRepository;
    use std::sync::Arc;

    fn processor() -> (ReservationProcessor, SharedRepository) {
        let repository: SharedRepository = Arc::new(InMemoryReservationRepository::new());
        (ReservationProcessor::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn payload_becomes_reservation_name() {
        let (processor, repository) = processor();

        let saved = processor.handle_payload(Some("Alice".as_bytes())).await.unwrap().unwrap();

        assert_eq!(saved.name, "Alice");
        assert_eq!(repository.find_by_id(saved.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn payload_is_kept_verbatim() {
        let (processor, _) = processor();
        let saved = processor.accept("  Dr. Alice  \n").await.unwrap();
        assert_eq!(saved.name, "  Dr. Alice  \n");
    }

    #[tokio::test]
    async fn empty_payload_is_skipped() {
        let (processor, repository) = processor();

        assert!(processor.handle_payload(None).await.unwrap().is_none());
        assert!(repository.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_dropped() {
        let (processor, repository) = processor();

        assert!(processor.handle_payload(Some(&[0xff_u8, 0xfe][..])).await.is_err());
        assert!(repository.find_all().await.unwrap().is_empty());
    }
}

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use crate::models::*;
use crate::repository::ReservationRepository;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Reservation>,
    last_id: i64,
}

/// Process-local store. Ids come from a sequence that only grows, so a
/// deleted id is never handed out again.
#[derive(Default)]
pub struct InMemoryReservationRepository {
    table: RwLock<Table>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn save(&self, reservation: NewReservation) -> Result<Reservation> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let saved = Reservation {
            id: table.last_id,
            name: reservation.name,
        };
        table.rows.insert(saved.id, saved.clone());

        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Reservation>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Reservation>> {
        let table = self.table.read().await;
        let content = table
            .rows
            .values()
            .skip(usize::try_from(request.offset())?)
            .take(usize::try_from(request.size)?)
            .cloned()
            .collect();

        Ok(Page {
            content,
            request,
            total_elements: i64::try_from(table.rows.len())?,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Reservation>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Reservation>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|reservation| reservation.name == name)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection, RunQueryDsl};
use std::sync::Arc;
use crate::models::*;
use crate::schema::*;

type DbPool = Pool<AsyncPgConnection>;

pub type SharedRepository = Arc<dyn ReservationRepository>;

/// Storage seam shared by the HTTP resource, the ingestion listener and the
/// seed task. Every `save` is its own unit of work.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn save(&self, reservation: NewReservation) -> Result<Reservation>;

    /// All rows in ascending id order.
    async fn find_all(&self) -> Result<Vec<Reservation>>;

    async fn find_page(&self, request: PageRequest) -> Result<Page<Reservation>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Reservation>>;

    /// Case-sensitive exact match on `name`.
    async fn find_by_name(&self, name: &str) -> Result<Vec<Reservation>>;

    /// Returns `false` when no row had that id.
    async fn delete_by_id(&self, id: i64) -> Result<bool>;
}

pub struct PgReservationRepository {
    pool: DbPool,
}

impl PgReservationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = bb8::Pool::builder().build(config).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn save(&self, reservation: NewReservation) -> Result<Reservation> {
        let mut conn = self.pool.get().await?;

        let saved = diesel::insert_into(reservations::table)
            .values(&reservation)
            .get_result::<Reservation>(&mut conn)
            .await?;

        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Reservation>> {
        let mut conn = self.pool.get().await?;

        let rows = reservations::table
            .order(reservations::id.asc())
            .load::<Reservation>(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Reservation>> {
        let mut conn = self.pool.get().await?;

        let total_elements = reservations::table
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let content = reservations::table
            .order(reservations::id.asc())
            .limit(request.size)
            .offset(request.offset())
            .load::<Reservation>(&mut conn)
            .await?;

        Ok(Page {
            content,
            request,
            total_elements,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Reservation>> {
        let mut conn = self.pool.get().await?;

        let result = reservations::table
            .find(id)
            .first::<Reservation>(&mut conn)
            .await
            .optional()?;

        Ok(result)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Reservation>> {
        let mut conn = self.pool.get().await?;

        let rows = reservations::table
            .filter(reservations::name.eq(name))
            .order(reservations::id.asc())
            .load::<Reservation>(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(reservations::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(deleted > 0)
    }
}

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use shared::ReservationResource;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::reservations)]
pub struct Reservation {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::reservations)]
pub struct NewReservation {
    pub name: String,
}

impl NewReservation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reservation{{id={}, name='{}'}}", self.id, self.name)
    }
}

impl From<Reservation> for ReservationResource {
    fn from(reservation: Reservation) -> Self {
        ReservationResource::new(reservation.id, reservation.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub const DEFAULT_SIZE: i64 = 20;
    pub const MAX_SIZE: i64 = 1000;

    /// Clamps out-of-range values instead of rejecting them.
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.unwrap_or(0).max(0);
        let size = match size {
            Some(size) if size > 0 => size.min(Self::MAX_SIZE),
            _ => Self::DEFAULT_SIZE,
        };
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub request: PageRequest,
    pub total_elements: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        (self.total_elements + self.request.size - 1) / self.request.size
    }
}

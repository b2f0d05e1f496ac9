use anyhow::Result;
use tracing::info;
use crate::models::*;
use crate::repository::ReservationRepository;

pub const SAMPLE_NAMES: [&str; 8] = [
    "Josh", "Thivakar", "André", "Thomas", "Markus", "Patrick", "Mugdin", "Uwe",
];

/// Inserts the sample reservations and logs the whole table afterwards.
/// Running it again against the same store inserts the names again.
pub async fn seed_sample_data(repository: &dyn ReservationRepository) -> Result<Vec<Reservation>> {
    for name in SAMPLE_NAMES {
        repository.save(NewReservation::new(name)).await?;
    }

    let all = repository.find_all().await?;
    for reservation in &all {
        info!("{}", reservation);
    }

    Ok(all)
}

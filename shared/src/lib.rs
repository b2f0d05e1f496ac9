use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RESERVATIONS_PATH: &str = "/reservations";
pub const RESERVATIONS_REL: &str = "reservations";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub reservation: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationResource {
    pub id: i64,
    pub name: String,
    #[serde(rename = "_links")]
    pub links: ReservationLinks,
}

impl ReservationResource {
    pub fn new(id: i64, name: String) -> Self {
        let href = format!("{}/{}", RESERVATIONS_PATH, id);
        Self {
            id,
            name,
            links: ReservationLinks {
                self_link: Link::new(href.clone()),
                reservation: Link::new(href),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedReservations {
    pub reservations: Vec<ReservationResource>,
}

/// Hypermedia collection envelope: `_embedded`, `_links` and, for paged
/// listings, `page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionModel {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedReservations,
    #[serde(rename = "_links")]
    pub links: BTreeMap<String, Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageMetadata>,
}

impl CollectionModel {
    pub fn new(reservations: Vec<ReservationResource>) -> Self {
        Self {
            embedded: EmbeddedReservations { reservations },
            links: BTreeMap::new(),
            page: None,
        }
    }

    pub fn with_link(mut self, rel: &str, href: impl Into<String>) -> Self {
        self.links.insert(rel.to_string(), Link::new(href));
        self
    }

    pub fn with_page(mut self, page: PageMetadata) -> Self {
        self.page = Some(page);
        self
    }

    pub fn reservations(&self) -> &[ReservationResource] {
        &self.embedded.reservations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number: i64,
}

/// Links-only body, used for the search index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksModel {
    #[serde(rename = "_links")]
    pub links: BTreeMap<String, Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

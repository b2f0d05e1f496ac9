use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use shared::*;
use std::sync::Arc;
use crate::config::LiveConfig;
use crate::models::*;
use crate::repository::SharedRepository;

pub const HEALTH_STATUS: &str = "I <3 Nexon!!";

const BY_NAME_PATH: &str = "/reservations/search/by-name";

#[derive(Clone)]
pub struct AppState {
    pub repository: SharedRepository,
    pub config: Arc<LiveConfig>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ByNameParams {
    pub rn: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/message", get(read_message))
        .route("/refresh", post(refresh_config))
        .route("/health", get(health_check))
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/search", get(search_index))
        .route(BY_NAME_PATH, get(find_by_name))
        .route("/reservations/:id", get(get_reservation).delete(delete_reservation))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

fn internal_error(context: &str, e: anyhow::Error) -> ApiError {
    tracing::error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("{}: {}", context, e),
        }),
    )
}

fn not_found(id: i64) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Reservation {} not found", id),
        }),
    )
}

pub async fn read_message(State(state): State<AppState>) -> String {
    state.config.message().await
}

pub async fn refresh_config(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    state
        .config
        .refresh()
        .await
        .map(Json)
        .map_err(|e| internal_error("Failed to refresh configuration", e))
}

pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: HEALTH_STATUS.to_string(),
    })
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<CollectionModel>, ApiError> {
    let request = PageRequest::new(params.page, params.size);
    let page = state
        .repository
        .find_page(request)
        .await
        .map_err(|e| internal_error("Failed to list reservations", e))?;

    let metadata = PageMetadata {
        size: request.size,
        total_elements: page.total_elements,
        total_pages: page.total_pages(),
        number: request.page,
    };
    let resources = page.content.into_iter().map(ReservationResource::from).collect();

    Ok(Json(
        CollectionModel::new(resources)
            .with_link("self", RESERVATIONS_PATH)
            .with_link("search", "/reservations/search")
            .with_page(metadata),
    ))
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<Response, ApiError> {
    let saved = state
        .repository
        .save(NewReservation::new(request.name))
        .await
        .map_err(|e| internal_error("Failed to create reservation", e))?;

    tracing::info!("Created {} via HTTP", saved);
    let resource = ReservationResource::from(saved);
    let location = resource.links.self_link.href.clone();

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(resource)).into_response())
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReservationResource>, ApiError> {
    let reservation = state
        .repository
        .find_by_id(id)
        .await
        .map_err(|e| internal_error("Failed to load reservation", e))?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(reservation.into()))
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .repository
        .delete_by_id(id)
        .await
        .map_err(|e| internal_error("Failed to delete reservation", e))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

pub async fn search_index() -> Json<LinksModel> {
    let mut model = LinksModel::default();
    model.links.insert("by-name".to_string(), Link::new(format!("{}{{?rn}}", BY_NAME_PATH)));
    model.links.insert("self".to_string(), Link::new("/reservations/search"));
    Json(model)
}

/// An absent `rn` matches nothing rather than failing.
pub async fn find_by_name(
    State(state): State<AppState>,
    Query(params): Query<ByNameParams>,
) -> Result<Json<CollectionModel>, ApiError> {
    let matches = match params.rn {
        Some(name) => state
            .repository
            .find_by_name(&name)
            .await
            .map_err(|e| internal_error("Failed to search reservations", e))?,
        None => Vec::new(),
    };

    let resources = matches.into_iter().map(ReservationResource::from).collect();
    Ok(Json(CollectionModel::new(resources).with_link("self", BY_NAME_PATH)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use crate::memory::InMemoryReservationRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::io::Write;
    use tower::ServiceExt;

    fn state(message: &str) -> (AppState, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "message: {}", message).unwrap();
        let config = LiveConfig::load(ConfigSource::new(file.path())).unwrap();
        let state = AppState {
            repository: Arc::new(InMemoryReservationRepository::new()),
            config: Arc::new(config),
        };
        (state, file)
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn message_is_returned_as_plain_text() {
        let (state, _file) = state("Hi there");
        let response = create_router(state)
            .oneshot(Request::get("/message").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body_string(response).await, "Hi there");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (state, _file) = state("x");
        let router = create_router(state);

        let response = router
            .clone()
            .oneshot(Request::get("/reservations/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(Request::delete("/reservations/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn by_name_without_parameter_is_empty() {
        let (state, _file) = state("x");
        state.repository.save(NewReservation::new("Josh")).await.unwrap();

        let response = create_router(state)
            .oneshot(Request::get(BY_NAME_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: CollectionModel = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body.reservations().is_empty());
    }

    #[tokio::test]
    async fn search_index_links_by_name() {
        let response = search_index().await;
        assert_eq!(
            response.0.links["by-name"].href,
            "/reservations/search/by-name{?rn}"
        );
    }
}

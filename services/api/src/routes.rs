use crate::infra::{deserialize_optional_date, resolve_today, AppState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use food_share::error::AppError;
use food_share::exchange::report::{
    self, CatalogEntry, ContactEntry, DashboardSummary, DonationsAnalysis, FilterOptions,
    ProviderInsights, ReceiverInsights, ReportKind, WastageReport,
};
use food_share::exchange::{
    AnnotatedListing, Claim, DatasetRepository, FilterPredicates, FoodListing, Provider,
    Receiver, RecordId, TableRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FilterRequest {
    #[serde(flatten)]
    pub(crate) predicates: FilterPredicates,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FilterResponse {
    pub(crate) today: NaiveDate,
    pub(crate) listing_count: usize,
    pub(crate) claim_count: usize,
    pub(crate) total_quantity: u64,
    pub(crate) listings: Vec<AnnotatedListing>,
    pub(crate) claims: Vec<Claim>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default)]
    pub(crate) city: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) format: ReportFormat,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContactQuery {
    #[serde(default)]
    pub(crate) city: Option<String>,
}

/// Exchange endpoints sharing one repository.
pub(crate) fn exchange_router<R>(repository: Arc<R>) -> Router
where
    R: DatasetRepository + 'static,
{
    let router = Router::new()
        .route("/api/v1/listings/filter", post(filter_handler::<R>))
        .route("/api/v1/dashboard", post(dashboard_handler::<R>))
        .route("/api/v1/filters/options", get(filter_options_handler::<R>))
        .route("/api/v1/contacts", get(contacts_handler::<R>))
        .route("/api/v1/reports", get(catalog_handler))
        .route("/api/v1/reports/:slug", get(report_handler::<R>))
        .route("/api/v1/insights/donations", get(donations_handler::<R>))
        .route("/api/v1/insights/providers", get(provider_insights_handler::<R>))
        .route("/api/v1/insights/receivers", get(receiver_insights_handler::<R>))
        .route("/api/v1/insights/wastage", post(wastage_handler::<R>));

    let router = record_routes::<R, Provider>(router, "/api/v1/providers");
    let router = record_routes::<R, Receiver>(router, "/api/v1/receivers");
    let router = record_routes::<R, FoodListing>(router, "/api/v1/listings");
    let router = record_routes::<R, Claim>(router, "/api/v1/claims");

    router.with_state(repository)
}

fn record_routes<R, T>(router: Router<Arc<R>>, path: &str) -> Router<Arc<R>>
where
    R: DatasetRepository + 'static,
    T: TableRecord,
{
    router
        .route(path, get(list_handler::<R, T>).post(insert_handler::<R, T>))
        .route(
            &format!("{path}/:id"),
            put(update_handler::<R, T>).delete(delete_handler::<R, T>),
        )
}

pub(crate) fn with_service_routes<R>(repository: Arc<R>) -> Router
where
    R: DatasetRepository + 'static,
{
    exchange_router(repository)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn filter_handler<R>(
    State(repository): State<Arc<R>>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<FilterResponse>, AppError>
where
    R: DatasetRepository + 'static,
{
    let FilterRequest { predicates, today } = request;
    let today = resolve_today(today);
    let dataset = repository.snapshot()?;
    let outcome = dataset.filter(&predicates, today);
    debug!(?predicates, listings = outcome.listings.len(), "filter request served");

    Ok(Json(FilterResponse {
        today,
        listing_count: outcome.listings.len(),
        claim_count: outcome.claims.len(),
        total_quantity: outcome.total_quantity(),
        listings: outcome.annotated(today),
        claims: outcome.claims,
    }))
}

pub(crate) async fn dashboard_handler<R>(
    State(repository): State<Arc<R>>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<DashboardSummary>, AppError>
where
    R: DatasetRepository + 'static,
{
    let today = resolve_today(request.today);
    let dataset = repository.snapshot()?;
    Ok(Json(report::dashboard(&dataset, &request.predicates, today)))
}

pub(crate) async fn filter_options_handler<R>(
    State(repository): State<Arc<R>>,
) -> Result<Json<FilterOptions>, AppError>
where
    R: DatasetRepository + 'static,
{
    let dataset = repository.snapshot()?;
    Ok(Json(FilterOptions::from_dataset(&dataset)))
}

pub(crate) async fn contacts_handler<R>(
    State(repository): State<Arc<R>>,
    Query(query): Query<ContactQuery>,
) -> Result<Json<Vec<ContactEntry>>, AppError>
where
    R: DatasetRepository + 'static,
{
    let dataset = repository.snapshot()?;
    Ok(Json(report::contact_directory(
        &dataset,
        query.city.as_deref(),
    )))
}

pub(crate) async fn catalog_handler() -> Json<Vec<CatalogEntry>> {
    Json(ReportKind::catalog())
}

pub(crate) async fn report_handler<R>(
    State(repository): State<Arc<R>>,
    Path(slug): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError>
where
    R: DatasetRepository + 'static,
{
    let today = resolve_today(query.today);
    let dataset = repository.snapshot()?;
    let table = report::run_report(&slug, &dataset, query.city.as_deref(), today)?;

    match query.format {
        ReportFormat::Json => Ok(Json(table).into_response()),
        ReportFormat::Csv => {
            let body = table.to_csv()?;
            let headers = [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", table.file_name()),
                ),
            ];
            Ok((headers, body).into_response())
        }
    }
}

pub(crate) async fn donations_handler<R>(
    State(repository): State<Arc<R>>,
) -> Result<Json<DonationsAnalysis>, AppError>
where
    R: DatasetRepository + 'static,
{
    let dataset = repository.snapshot()?;
    Ok(Json(report::donations_analysis(&dataset)))
}

pub(crate) async fn provider_insights_handler<R>(
    State(repository): State<Arc<R>>,
) -> Result<Json<ProviderInsights>, AppError>
where
    R: DatasetRepository + 'static,
{
    let dataset = repository.snapshot()?;
    Ok(Json(report::provider_insights(&dataset)))
}

pub(crate) async fn receiver_insights_handler<R>(
    State(repository): State<Arc<R>>,
) -> Result<Json<ReceiverInsights>, AppError>
where
    R: DatasetRepository + 'static,
{
    let dataset = repository.snapshot()?;
    Ok(Json(report::receiver_insights(&dataset)))
}

/// Same body as the filter route; the predicates pick which listings are bucketed.
pub(crate) async fn wastage_handler<R>(
    State(repository): State<Arc<R>>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<WastageReport>, AppError>
where
    R: DatasetRepository + 'static,
{
    let today = resolve_today(request.today);
    let dataset = repository.snapshot()?;
    Ok(Json(report::wastage(&dataset, &request.predicates, today)))
}

pub(crate) async fn list_handler<R, T>(
    State(repository): State<Arc<R>>,
) -> Result<Json<Vec<T>>, AppError>
where
    R: DatasetRepository + 'static,
    T: TableRecord,
{
    let dataset = repository.snapshot()?;
    Ok(Json(T::rows(&dataset).clone()))
}

pub(crate) async fn insert_handler<R, T>(
    State(repository): State<Arc<R>>,
    Json(record): Json<T>,
) -> Result<(StatusCode, Json<T>), AppError>
where
    R: DatasetRepository + 'static,
    T: TableRecord,
{
    let record = repository.insert(record)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn update_handler<R, T>(
    State(repository): State<Arc<R>>,
    Path(id): Path<u32>,
    Json(mut record): Json<T>,
) -> Result<Json<T>, AppError>
where
    R: DatasetRepository + 'static,
    T: TableRecord,
{
    record.set_id(T::Id::new(id));
    Ok(Json(repository.update(record)?))
}

pub(crate) async fn delete_handler<R, T>(
    State(repository): State<Arc<R>>,
    Path(id): Path<u32>,
) -> Result<Json<T>, AppError>
where
    R: DatasetRepository + 'static,
    T: TableRecord,
{
    Ok(Json(repository.delete::<T>(T::Id::new(id))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Duration;
    use food_share::exchange::{
        ClaimId, ClaimStatus, Dataset, FoodId, InMemoryDatasetRepository, ProviderId, ReceiverId,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 10).expect("valid date")
    }

    fn dataset() -> Dataset {
        let listing = |id: u32, provider: u32, location: &str, offset: i64| FoodListing {
            id: FoodId(id),
            name: format!("Tray {id}"),
            quantity: 5,
            expiry_date: Some(today() + Duration::days(offset)),
            provider_id: ProviderId(provider),
            provider_type: "Restaurant".to_string(),
            location: location.to_string(),
            food_type: "Vegetarian".to_string(),
            meal_type: "Lunch".to_string(),
        };

        Dataset {
            providers: vec![Provider {
                id: ProviderId(1),
                name: "Corner Bistro".to_string(),
                kind: "Restaurant".to_string(),
                address: None,
                city: "Springfield".to_string(),
                contact: "bistro@example.org".to_string(),
            }],
            receivers: vec![Receiver {
                id: ReceiverId(1),
                name: "Food Bank".to_string(),
                kind: "Charity".to_string(),
                city: "Springfield".to_string(),
                contact: "555-0199".to_string(),
            }],
            listings: vec![
                listing(1, 1, "Unknown", -3),
                listing(2, 7, "Shelbyville", 2),
            ],
            claims: vec![
                Claim {
                    id: ClaimId(1),
                    food_id: FoodId(1),
                    receiver_id: ReceiverId(1),
                    status: ClaimStatus::Completed,
                    timestamp: None,
                },
                Claim {
                    id: ClaimId(2),
                    food_id: FoodId(999),
                    receiver_id: ReceiverId(1),
                    status: ClaimStatus::Pending,
                    timestamp: None,
                },
            ],
        }
    }

    fn router() -> Router {
        exchange_router(Arc::new(InMemoryDatasetRepository::new(dataset())))
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("encode")))
            .expect("request")
    }

    #[tokio::test]
    async fn filter_route_narrows_listings_and_claims_together() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/api/v1/listings/filter",
                json!({ "city": "springfield", "today": "2025-05-10" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json_body(response).await;
        assert_eq!(body["listing_count"], 1);
        assert_eq!(body["claim_count"], 1);
        assert_eq!(body["listings"][0]["days_to_expiry"], 3);
        assert_eq!(body["listings"][0]["is_expired"], true);
        assert_eq!(body["claims"][0]["status"], "Completed");
    }

    #[tokio::test]
    async fn filter_route_with_unknown_provider_is_empty() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/api/v1/listings/filter",
                json!({ "provider_name": "Nobody", "today": "2025-05-10" }),
            ))
            .await
            .expect("response");
        let body = read_json_body(response).await;
        assert_eq!(body["listing_count"], 0);
        assert_eq!(body["claim_count"], 0);
    }

    #[tokio::test]
    async fn empty_predicates_keep_every_listing() {
        let repository = Arc::new(InMemoryDatasetRepository::new(dataset()));
        let Json(body) = filter_handler(
            State(repository),
            Json(FilterRequest {
                today: Some(today()),
                ..FilterRequest::default()
            }),
        )
        .await
        .expect("filter succeeds");
        assert_eq!(body.listing_count, 2);
        // claim on food 999 never survives
        assert_eq!(body.claim_count, 1);
    }

    #[tokio::test]
    async fn report_route_returns_csv_on_request() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/reports/expired-listings?today=2025-05-10&format=csv")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .expect("read body");
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(
            text.starts_with("Food_ID,Food_Name,Quantity,Expiry_Date,Provider_Name,Location\n")
        );
        assert!(text.contains("1,Tray 1,5,2025-05-07,Corner Bistro,Unknown"));
    }

    #[tokio::test]
    async fn report_route_maps_errors_to_statuses() {
        let missing_city = router()
            .oneshot(
                Request::get("/api/v1/reports/provider-contacts")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(missing_city.status(), StatusCode::BAD_REQUEST);

        let unknown = router()
            .oneshot(
                Request::get("/api/v1/reports/q42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn insight_routes_aggregate_the_snapshot() {
        let donations = router()
            .oneshot(
                Request::get("/api/v1/insights/donations")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(donations.status(), StatusCode::OK);
        let body = read_json_body(donations).await;
        assert_eq!(body["monthly"], json!([{ "label": "2025-05", "quantity": 10 }]));
        assert_eq!(body["meal_types"][0]["percentage"], 100.0);

        let providers = router()
            .oneshot(
                Request::get("/api/v1/insights/providers")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let body = read_json_body(providers).await;
        // listing 2 belongs to an unregistered provider
        assert_eq!(
            body["top_providers"],
            json!([{ "label": "Corner Bistro", "quantity": 5 }])
        );

        let receivers = router()
            .oneshot(
                Request::get("/api/v1/insights/receivers")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let body = read_json_body(receivers).await;
        assert_eq!(body["cities"], json!([{ "city": "Springfield", "claims": 2 }]));
    }

    #[tokio::test]
    async fn wastage_route_buckets_filtered_listings() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/api/v1/insights/wastage",
                json!({ "today": "2025-05-10", "days_window": { "min": 0, "max": 2 } }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json_body(response).await;
        assert_eq!(body["buckets"], json!([{ "days_to_expiry": 2, "quantity": 5 }]));
        assert_eq!(body["expired"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["expired"][0]["id"], 1);
    }

    #[tokio::test]
    async fn record_routes_edit_the_shared_dataset() {
        let repository = Arc::new(InMemoryDatasetRepository::new(dataset()));
        let app = exchange_router(repository.clone());

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/receivers",
                json!({
                    "name": "Night Shelter",
                    "type": "Shelter",
                    "city": "Shelbyville",
                    "contact": "night@example.org"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(created.status(), StatusCode::CREATED);
        let body = read_json_body(created).await;
        assert_eq!(body["id"], 2);

        let deleted = app
            .clone()
            .oneshot(
                Request::delete("/api/v1/listings/1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(deleted.status(), StatusCode::OK);

        let missing = app
            .oneshot(json_request(
                "PUT",
                "/api/v1/providers/77",
                serde_json::to_value(&dataset().providers[0]).expect("encode"),
            ))
            .await
            .expect("response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let snapshot = repository.snapshot().expect("snapshot");
        assert_eq!(snapshot.receivers.len(), 2);
        assert_eq!(snapshot.listings.len(), 1);
        assert_eq!(snapshot.filter(&FilterPredicates::new(), today()).claims.len(), 0);
    }

    #[tokio::test]
    async fn readiness_follows_the_shared_flag() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let readiness = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let app = with_service_routes(Arc::new(InMemoryDatasetRepository::default())).layer(
            Extension(AppState {
                readiness: readiness.clone(),
                metrics: Arc::new(recorder.handle()),
            }),
        );

        let pending = app
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(pending.status(), StatusCode::SERVICE_UNAVAILABLE);

        readiness.store(true, std::sync::atomic::Ordering::Release);
        let ready = app
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(ready.status(), StatusCode::OK);
        assert_eq!(read_json_body(ready).await["status"], "ready");
    }

    #[tokio::test]
    async fn catalog_lists_fifteen_reports() {
        let Json(entries) = catalog_handler().await;
        assert_eq!(entries.len(), 15);
        assert!(entries.iter().filter(|entry| entry.requires_city).count() == 1);
    }
}

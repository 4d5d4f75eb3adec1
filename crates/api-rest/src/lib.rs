//! # API REST
//!
//! REST API implementation for Pulse.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response types. All business logic lives in `pulse-core`;
//! the handlers here only convert between core types and DTOs.

#![warn(rust_2018_idioms)]

use api_shared::{
    AlertsRes, BiCountRes, DashboardRes, ErrorRes, FeedbackRes, HealthRes, HealthService,
    ListFeedbackRes, ListTemplatesRes, QuestionRes, SentimentPointRes, SubmitSurveyReq,
    SubmitSurveyRes, TemplateRes, TriCountRes,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use pulse_core::{
    BiCount, DashboardData, FeedbackError, FeedbackRecord, FeedbackService, SurveyTemplate,
    TriCount,
};
use std::time::Duration;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server.
///
/// Holds the wired-up core service; cloning shares the same store and dashboard cache.
#[derive(Clone)]
pub struct AppState {
    pub service: FeedbackService,
}

impl AppState {
    pub fn new(service: FeedbackService) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_surveys,
        get_survey,
        submit_survey,
        list_feedback,
        get_dashboard,
        get_alerts,
    ),
    components(schemas(
        HealthRes,
        QuestionRes,
        TemplateRes,
        ListTemplatesRes,
        SubmitSurveyReq,
        SubmitSurveyRes,
        FeedbackRes,
        ListFeedbackRes,
        TriCountRes,
        BiCountRes,
        SentimentPointRes,
        DashboardRes,
        AlertsRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/surveys", get(list_surveys))
        .route("/surveys/:id", get(get_survey))
        .route("/surveys/:id/responses", post(submit_survey))
        .route("/feedback", get(list_feedback))
        .route("/dashboard", get(get_dashboard))
        .route("/alerts", get(get_alerts))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the REST API on `addr` and keeps the dashboard refreshed every `refresh_interval`.
///
/// Runs until Ctrl-C, then stops accepting connections, lets in-flight requests finish and
/// stops the refresher.
///
/// # Errors
/// Returns an error if:
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(
    service: FeedbackService,
    addr: &str,
    refresh_interval: Duration,
) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = tokio::spawn(
        service
            .dashboard()
            .run_refresher(refresh_interval, shutdown_rx),
    );

    let app = router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {:?}", e);
            }
            tracing::info!("-- shutting down");
        })
        .await;

    let _ = shutdown_tx.send(true);
    refresher.await?;
    served?;

    Ok(())
}

/// Maps a core error to a status code and a client-safe message.
///
/// Validation messages are returned verbatim; anything else is logged and reported generically.
fn error_response(context: &str, e: FeedbackError) -> ApiError {
    let (status, message) = match &e {
        FeedbackError::UnknownTemplate(_) => (StatusCode::NOT_FOUND, e.to_string()),
        _ if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()),
        _ if e.is_storage() => {
            tracing::error!("{} storage error: {:?}", context, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store feedback".into())
        }
        _ => {
            tracing::error!("{} error: {:?}", context, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
        }
    };
    (status, Json(ErrorRes { error: message }))
}

fn template_res(template: &SurveyTemplate) -> TemplateRes {
    TemplateRes {
        id: template.id.clone(),
        name: template.name.clone(),
        questions: template
            .questions
            .iter()
            .map(|q| QuestionRes {
                key: q.key.clone(),
                prompt: q.prompt.clone(),
                kind: q.kind.as_str().into(),
            })
            .collect(),
    }
}

fn feedback_res(record: &FeedbackRecord) -> FeedbackRes {
    FeedbackRes {
        id: record.id.to_string(),
        template_id: record.template_id.to_string(),
        submitted_at: record.submitted_at.to_rfc3339(),
        raw_text: record.raw_text.clone(),
        rating: record.rating.map(|r| r.value()),
        yes_no: record.yes_no.map(|y| y.as_str().into()),
        text_sentiment: record.text_sentiment.map(|p| p.value()),
        source_language: record.source_language.clone(),
    }
}

fn tri_count_res(count: TriCount) -> TriCountRes {
    TriCountRes {
        positive: count.positive as u64,
        neutral: count.neutral as u64,
        negative: count.negative as u64,
    }
}

fn bi_count_res(count: BiCount) -> BiCountRes {
    BiCountRes {
        positive: count.positive as u64,
        negative: count.negative as u64,
    }
}

fn dashboard_res(data: DashboardData) -> DashboardRes {
    DashboardRes {
        rating: tri_count_res(data.snapshot.rating),
        yes_no: bi_count_res(data.snapshot.yes_no),
        text: tri_count_res(data.snapshot.text),
        total_records: data.snapshot.total_records as u64,
        feedback_over_time: data
            .feedback_over_time
            .iter()
            .map(|p| SentimentPointRes {
                submitted_at: p.submitted_at.to_rfc3339(),
                polarity: p.polarity,
            })
            .collect(),
        forecast: data.forecast,
        refreshed_at: data.refreshed_at.to_rfc3339(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/surveys",
    responses(
        (status = 200, description = "Available survey templates", body = ListTemplatesRes)
    )
)]
/// List every survey template, ordered by id.
#[axum::debug_handler]
async fn list_surveys(State(state): State<AppState>) -> Json<ListTemplatesRes> {
    let templates = state
        .service
        .templates()
        .list()
        .into_iter()
        .map(template_res)
        .collect();
    Json(ListTemplatesRes { templates })
}

#[utoipa::path(
    get,
    path = "/surveys/{id}",
    params(("id" = String, Path, description = "Survey template id")),
    responses(
        (status = 200, description = "Survey template", body = TemplateRes),
        (status = 404, description = "Unknown template", body = ErrorRes)
    )
)]
/// Fetch one survey template so a client can render its form.
#[axum::debug_handler]
async fn get_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateRes>, ApiError> {
    match state.service.templates().get(&id) {
        Some(template) => Ok(Json(template_res(template))),
        None => Err(error_response(
            "get_survey",
            FeedbackError::UnknownTemplate(id),
        )),
    }
}

#[utoipa::path(
    post,
    path = "/surveys/{id}/responses",
    params(("id" = String, Path, description = "Survey template id")),
    request_body = SubmitSurveyReq,
    responses(
        (status = 201, description = "Response stored", body = SubmitSurveyRes),
        (status = 400, description = "Invalid answers", body = ErrorRes),
        (status = 404, description = "Unknown template", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Submit one survey response
///
/// Answers are raw form values keyed by question key. Blank values count as unanswered.
///
/// # Errors
/// Returns:
/// - `400 Bad Request` if a key is unknown, a value does not fit its question, or nothing was
///   answered;
/// - `404 Not Found` if the template does not exist;
/// - `500 Internal Server Error` if the response could not be stored.
#[axum::debug_handler]
async fn submit_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitSurveyReq>,
) -> Result<(StatusCode, Json<SubmitSurveyRes>), ApiError> {
    let record = state
        .service
        .submit_survey(&id, &req.answers)
        .await
        .map_err(|e| error_response("submit_survey", e))?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitSurveyRes {
            id: record.id.to_string(),
            text_sentiment: record.text_sentiment.map(|p| p.value()),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/feedback",
    responses(
        (status = 200, description = "All stored feedback in submission order", body = ListFeedbackRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List every stored feedback record in submission order.
#[axum::debug_handler]
async fn list_feedback(
    State(state): State<AppState>,
) -> Result<Json<ListFeedbackRes>, ApiError> {
    let records = state
        .service
        .records()
        .map_err(|e| error_response("list_feedback", e))?;
    Ok(Json(ListFeedbackRes {
        feedback: records.iter().map(feedback_res).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Most recently refreshed dashboard data", body = DashboardRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Dashboard aggregates as of the last refresh.
#[axum::debug_handler]
async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardRes>, ApiError> {
    let data = state
        .service
        .get_dashboard_data()
        .map_err(|e| error_response("get_dashboard", e))?;
    Ok(Json(dashboard_res(data)))
}

#[utoipa::path(
    get,
    path = "/alerts",
    responses(
        (status = 200, description = "Alerts raised by the current feedback", body = AlertsRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Alerts for the feedback stored right now.
#[axum::debug_handler]
async fn get_alerts(State(state): State<AppState>) -> Result<Json<AlertsRes>, ApiError> {
    let alerts = state
        .service
        .get_alerts()
        .map_err(|e| error_response("get_alerts", e))?;
    Ok(Json(AlertsRes {
        alerts: alerts.into_iter().map(|a| a.to_string()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use pulse_core::{
        AlertEvaluator, DashboardService, DisabledTranslator, FeedbackResult, FeedbackStore,
        IntakeService, LanguageDetector, LexiconClassifier, LogFile, TemplateRegistry,
    };
    use std::io::{self, Write};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct EnglishDetector;

    impl LanguageDetector for EnglishDetector {
        fn detect(&self, _text: &str) -> FeedbackResult<String> {
            Ok("en".into())
        }
    }

    /// Log on a device with no space left: every write fails.
    #[derive(Debug)]
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogFile for FullDisk {
        fn byte_len(&self) -> io::Result<u64> {
            Ok(0)
        }

        fn truncate(&mut self, _len: u64) -> io::Result<()> {
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn app(tmp: &TempDir) -> Router {
        let store = Arc::new(FeedbackStore::open(tmp.path().join("feedback.jsonl")).unwrap());
        app_over(store)
    }

    fn app_over(store: Arc<FeedbackStore>) -> Router {
        let intake = IntakeService::new(
            Arc::new(TemplateRegistry::with_builtin()),
            store.clone(),
            Arc::new(LexiconClassifier::new()),
            Arc::new(EnglishDetector),
            Arc::new(DisabledTranslator),
            "en",
        );
        let dashboard = Arc::new(DashboardService::new(
            store.clone(),
            AlertEvaluator::with_default_rules(),
        ));
        router(AppState::new(FeedbackService::from_parts(
            store, intake, dashboard,
        )))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn submit_req(template: &str, answers: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/surveys/{template}/responses"))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "answers": answers }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = send(&app(&tmp), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn surveys_lists_and_fetches_templates() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = send(&app, get_req("/surveys")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["templates"][0]["id"], "default");

        let (status, body) = send(&app, get_req("/surveys/default")).await;
        assert_eq!(status, StatusCode::OK);
        let kinds: Vec<_> = body["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["rating", "yesno", "text"]);

        let (status, _) = send(&app, get_req("/surveys/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submit_stores_and_returns_created() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = send(
            &app,
            submit_req(
                "default",
                serde_json::json!({
                    "rating": "2",
                    "recommend": "No",
                    "feedback": "The staff were rude and the service was terrible"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["text_sentiment"].as_f64().unwrap() < 0.0);

        let (status, body) = send(&app, get_req("/feedback")).await;
        assert_eq!(status, StatusCode::OK);
        let feedback = body["feedback"].as_array().unwrap();
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0]["rating"], 2);
        assert_eq!(feedback[0]["yes_no"], "negative");
        assert_eq!(feedback[0]["source_language"], "en");
    }

    #[tokio::test]
    async fn submit_maps_errors_to_status_codes() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) =
            send(&app, submit_req("default", serde_json::json!({ "rating": "9" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("rating"));

        let (status, _) = send(&app, submit_req("default", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, submit_req("missing", serde_json::json!({ "rating": "3" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, get_req("/feedback")).await;
        assert!(body["feedback"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dashboard_and_alerts_reflect_submissions() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        for _ in 0..6 {
            let (status, _) = send(
                &app,
                submit_req(
                    "default",
                    serde_json::json!({ "feedback": "terrible, awful service" }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, get_req("/dashboard")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_records"], 6);
        assert_eq!(body["text"]["negative"], 6);
        assert_eq!(body["feedback_over_time"].as_array().unwrap().len(), 6);

        let (status, body) = send(&app, get_req("/alerts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["alerts"],
            serde_json::json!(["High number of negative feedback detected!"])
        );
    }

    #[tokio::test]
    async fn storage_failure_is_reported_as_server_error() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(
            FeedbackStore::from_log(tmp.path().join("feedback.jsonl"), Box::new(FullDisk))
                .unwrap(),
        );
        let app = app_over(store);

        let (status, body) =
            send(&app, submit_req("default", serde_json::json!({ "rating": "4" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to store feedback");

        let (status, body) = send(&app, get_req("/feedback")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["feedback"].as_array().unwrap().is_empty());

        let (_, body) = send(&app, get_req("/dashboard")).await;
        assert_eq!(body["total_records"], 0);
    }
}

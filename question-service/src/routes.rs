use axum::{
    Json, Router,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use exam_utils::{Question, Topic};

use crate::{config::AppState, error::Error};

/// All routes, without the HTTP middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/health", get(get_health))
        .route("/status/ping", get(get_status_ping))
        .route("/api/topics", get(get_topics))
        .route("/api/topics/{topic_id}", get(get_topic))
        .route("/api/topics/{topic_id}/check", get(get_topic_check))
        .route("/api/questions/topic/{topic_id}", get(get_questions_by_topic))
        .route("/api/questions/count", get(get_question_count))
        .route("/api/questions/{id}", get(get_question))
        .route(
            "/api/questions/random/{topic_id}/{count}",
            get(get_random_questions),
        )
        .fallback(not_found)
        .with_state(state)
}

pub async fn get_status_ping() -> impl IntoResponse {
    info!("Status");
    StatusCode::OK
}

pub async fn get_index() -> Json<Value> {
    Json(json!({
        "message": "API del Estudio Estratégico Policial",
        "version": env!("CARGO_PKG_VERSION"),
        "availableEndpoints": {
            "topics": "/api/topics",
            "questions": "/api/questions",
            "health": "/health",
        },
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    status: &'static str,
    db_status: &'static str,
    timestamp: DateTime<Utc>,
}

pub async fn get_health(State(state): State<AppState>) -> Json<Health> {
    let db_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(error = %e, "question store unreachable");
            "disconnected"
        }
    };

    Json(Health {
        status: "healthy",
        db_status,
        timestamp: Utc::now(),
    })
}

pub async fn get_topics(State(state): State<AppState>) -> Result<Json<Vec<Topic>>, Error> {
    let topics = state.store.list_topics().await?;
    if topics.is_empty() {
        return Err(Error::Server(
            StatusCode::NOT_FOUND,
            "No se encontraron temas".to_string(),
        ));
    }
    Ok(Json(topics))
}

pub async fn get_topic(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<Json<Topic>, Error> {
    Ok(Json(state.store.get_topic(&topic_id).await?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCheck {
    exists: bool,
    has_questions: bool,
    count: usize,
    topic: Topic,
}

pub async fn get_topic_check(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<Json<TopicCheck>, Error> {
    let (topic, count) = tokio::try_join!(
        state.store.get_topic(&topic_id),
        state.store.count_questions(&topic_id)
    )?;

    Ok(Json(TopicCheck {
        exists: true,
        has_questions: count > 0,
        count,
        topic,
    }))
}

pub async fn get_questions_by_topic(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<Json<Vec<Question>>, Error> {
    let questions = state.store.list_questions(&topic_id).await?;
    if questions.is_empty() {
        return Err(exam_utils::error::Error::EmptyResult(topic_id).into());
    }
    Ok(Json(questions))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountQuery {
    topic_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCount {
    count: usize,
    topic_id: String,
}

pub async fn get_question_count(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Result<Json<QuestionCount>, Error> {
    let Some(topic_id) = query.topic_id.filter(|id| !id.is_empty()) else {
        return Err(Error::Server(
            StatusCode::BAD_REQUEST,
            "Se requiere el ID del tema".to_string(),
        ));
    };

    let count = state.store.count_questions(&topic_id).await?;
    Ok(Json(QuestionCount { count, topic_id }))
}

pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Question>, Error> {
    Ok(Json(state.store.get_question(&id).await?))
}

pub async fn get_random_questions(
    State(state): State<AppState>,
    Path((topic_id, count)): Path<(String, String)>,
) -> Result<Json<Vec<Question>>, Error> {
    let count = match count.parse::<i64>() {
        Ok(n) if n > 0 => n as usize,
        _ => {
            return Err(Error::Server(
                StatusCode::BAD_REQUEST,
                "El conteo de preguntas debe ser un número positivo".to_string(),
            ));
        }
    };

    Ok(Json(state.store.sample_questions(&topic_id, count).await?))
}

pub async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Endpoint no encontrado",
            "requestedUrl": uri.path(),
        })),
    )
}

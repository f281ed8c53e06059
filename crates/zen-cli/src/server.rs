//! Companion backend: the HTTP contract the web frontend calls.
//!
//! Serves the master chat (with the daily allowance) and the planner CRUD
//! surface against the local user store. The master answers from the quote
//! pool; there is no LLM behind this endpoint.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use zen_core::{
    CalendarDay, Priority, RepeatKind, Task, TaskFilter, TaskUpdate, expand_repeats, filter_tasks,
    master_reply, next_task_id, now_unix_secs, remove_task, task_stats, update_task,
};
use zen_store::UserStore;

pub struct ServerState {
    store: UserStore,
    rng: SmallRng,
}

type SharedState = Arc<Mutex<ServerState>>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/master/chat", post(master_chat))
        .route("/api/master/remaining_chats", get(remaining_chats))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/stats", get(tasks_stats))
        .route("/api/tasks/{id}", put(put_task).delete(del_task))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn run(store: UserStore, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(Mutex::new(ServerState {
        store,
        rng: SmallRng::from_os_rng(),
    }));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tracing::info!("companion backend listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

// ---------------------------------------------------------------------------
// Master chat
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    // Accepted for contract compatibility; this server holds one profile.
    #[serde(default)]
    #[allow(dead_code)]
    user_id: String,
    #[serde(default)]
    #[allow(dead_code)]
    timestamp: String,
}

async fn master_chat(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    let now = now_unix_secs();

    let mut usage = state.store.store().load_chat_usage();
    if !usage.try_consume(now) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "今日对话次数已用完，明日再来",
                "remaining_chats": 0,
            })),
        );
    }
    if let Err(e) = state.store.store().save_chat_usage(&usage) {
        tracing::error!("failed to persist chat usage: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "storage failure", "details": e.to_string() })),
        );
    }

    let response = master_reply(&req.message, &mut state.rng);
    let remaining = usage.remaining(now);
    (
        StatusCode::OK,
        Json(json!({ "response": response, "remaining_chats": remaining })),
    )
}

#[derive(Debug, Deserialize)]
struct RemainingParams {
    #[serde(default)]
    #[allow(dead_code)]
    user_id: Option<String>,
}

async fn remaining_chats(
    State(state): State<SharedState>,
    Query(_params): Query<RemainingParams>,
) -> Json<Value> {
    let state = state.lock().await;
    let mut usage = state.store.store().load_chat_usage();
    Json(json!({ "remaining_chats": usage.remaining(now_unix_secs()) }))
}

// ---------------------------------------------------------------------------
// Planner tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListParams {
    filter: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

async fn list_tasks(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let state = state.lock().await;
    let tasks = state.store.store().load_tasks();
    let total = tasks.len();

    let filter = TaskFilter::parse(params.filter.as_deref().unwrap_or("all"));
    let today = CalendarDay::from_unix(now_unix_secs());
    let matched = filter_tasks(&tasks, filter, today);

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(10).max(1);
    let offset = (page - 1) * per_page;
    let page_items: Vec<&Task> = matched.into_iter().skip(offset).take(per_page).collect();

    Json(json!({
        "tasks": page_items,
        "total": total,
        "page": page,
        "per_page": per_page,
        "total_pages": total.div_ceil(per_page),
    }))
}

#[derive(Debug, Deserialize)]
struct CreateTask {
    title: String,
    priority: String,
    date: String,
    category: Option<String>,
    description: Option<String>,
    repeat_type: Option<String>,
    repeat_value: Option<u32>,
}

async fn create_task(
    State(state): State<SharedState>,
    Json(req): Json<CreateTask>,
) -> (StatusCode, Json<Value>) {
    let Some(priority) = Priority::parse(&req.priority) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("unknown priority: {}", req.priority) })),
        );
    };

    let state = state.lock().await;
    let mut tasks = state.store.store().load_tasks();

    let id = next_task_id(&tasks);
    let mut task = Task::new(id, &req.title, priority, &req.date);
    if let Some(category) = req.category {
        task.category = category;
    }
    if let Some(description) = req.description {
        task.description = description;
    }

    if let (Some(kind), Some(count)) = (req.repeat_type.as_deref(), req.repeat_value) {
        if let Some(kind) = RepeatKind::parse(kind) {
            task.repeat = kind;
            task.repeat_count = count;
        }
    }

    let instances = expand_repeats(&task, id + 1);
    tasks.push(task);
    tasks.extend(instances);

    if let Err(e) = state.store.store().save_tasks(&tasks) {
        tracing::error!("failed to save tasks: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "storage failure", "details": e.to_string() })),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Task created successfully" })),
    )
}

async fn put_task(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(update): Json<TaskUpdate>,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().await;
    let mut tasks = state.store.store().load_tasks();

    if !update_task(&mut tasks, id, &update) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("task {id} not found") })),
        );
    }
    if let Err(e) = state.store.store().save_tasks(&tasks) {
        tracing::error!("failed to save tasks: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "storage failure", "details": e.to_string() })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Task updated successfully" })),
    )
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    delete_all: Option<String>,
}

async fn del_task(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().await;
    let mut tasks = state.store.store().load_tasks();

    let delete_all = params.delete_all.as_deref() == Some("true");
    if remove_task(&mut tasks, id, delete_all) == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("task {id} not found") })),
        );
    }
    if let Err(e) = state.store.store().save_tasks(&tasks) {
        tracing::error!("failed to save tasks: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "storage failure", "details": e.to_string() })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Task deleted successfully" })),
    )
}

async fn tasks_stats(State(state): State<SharedState>) -> Json<Value> {
    let state = state.lock().await;
    let tasks = state.store.store().load_tasks();
    let today = CalendarDay::from_unix(now_unix_secs());
    let stats = task_stats(&tasks, today);

    Json(json!({
        "completed_total": stats.completed_total,
        "today_pending": stats.today_pending,
        "upcoming_total": stats.upcoming_total,
        "priority_stats": {
            "high": stats.high_pending,
            "medium": stats.medium_pending,
            "low": stats.low_pending,
        },
    }))
}

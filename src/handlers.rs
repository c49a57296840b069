use crate::day_key::canonical_day_key;
use crate::errors::AppError;
use crate::models::{
    Choice, EntryRecord, IndexQuery, SaveEntryForm, SaveEntryRequest, TrendResponse,
};
use crate::state::AppState;
use crate::trend::{WINDOW_DAYS, project, project_today};
use crate::ui::{IndexView, render_index};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use chrono::Local;

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let now = Local::now();
    let store = state.store.lock().await;
    let trend = project(store.entries(), &now, WINDOW_DAYS);

    Html(render_index(&IndexView {
        now: &now,
        today: store.entry_at(&now),
        entries: store.entries(),
        trend: &trend,
        saved: query.saved.is_some(),
        seed_enabled: state.seed_enabled,
    }))
}

pub async fn save_form(
    State(state): State<AppState>,
    Form(form): Form<SaveEntryForm>,
) -> Result<Redirect, AppError> {
    let choice = Choice::from_slug(form.choice.trim())
        .ok_or_else(|| AppError::bad_request("choice must be 'up', 'same' or 'down'"))?;

    let caption = form.caption;
    state
        .with_store(move |store| store.save(choice, &caption))
        .await??;
    Ok(Redirect::to("/?saved=1"))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(day_key): Path<String>,
) -> Result<Redirect, AppError> {
    state.with_store(move |store| store.delete(&day_key)).await??;
    Ok(Redirect::to("/"))
}

pub async fn clear_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.with_store(|store| store.clear_all()).await??;
    Ok(Redirect::to("/"))
}

pub async fn seed_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    seed(&state).await?;
    Ok(Redirect::to("/"))
}

pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<EntryRecord>> {
    Json(state.store.lock().await.entries().to_vec())
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<SaveEntryRequest>,
) -> Result<Json<EntryRecord>, AppError> {
    let SaveEntryRequest { choice, caption } = payload;
    let record = state
        .with_store(move |store| store.save(choice, &caption))
        .await??;
    Ok(Json(record))
}

pub async fn get_today(State(state): State<AppState>) -> Json<Option<EntryRecord>> {
    Json(state.store.lock().await.entry().cloned())
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(day_key): Path<String>,
) -> Result<Json<EntryRecord>, AppError> {
    let store = state.store.lock().await;
    store
        .find_key(&day_key)?
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no entry for {day_key}")))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(day_key): Path<String>,
) -> Result<StatusCode, AppError> {
    let day_key = canonical_day_key(&day_key)?;
    state.with_store(move |store| store.delete(&day_key)).await??;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_trend(State(state): State<AppState>) -> Json<TrendResponse> {
    let store = state.store.lock().await;
    let trend = project_today(store.entries());
    Json(TrendResponse {
        y_domain: trend.y_domain(),
        points: trend.points,
    })
}

pub async fn clear(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.with_store(|store| store.clear_all()).await??;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn seed_api(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    seed(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn seed(state: &AppState) -> Result<(), AppError> {
    if !state.seed_enabled {
        return Err(AppError::not_found("seeding is disabled"));
    }
    state.with_store(|store| store.seed_test_data()).await??;
    Ok(())
}

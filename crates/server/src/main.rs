use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use shared::{
    convert::{compute_volume, parse_distance, round_tenth, to_barrels},
    domain::{ResultId, Selector},
    error::{AppError, ErrorKind},
};
use storage::Storage;
use tracing::{error, info};

mod config;
mod views;

use config::{load_settings, prepare_database_url};
use views::{about_page, edit_page, flash_from_query, history_page, index_page, Flash};

#[derive(Clone)]
struct AppState {
    storage: Storage,
}

#[derive(Debug, Deserialize)]
struct SubmitForm {
    distance: String,
    selector: String,
    location_name: String,
    site_name: String,
}

#[derive(Debug, Deserialize)]
struct EditForm {
    location_name: String,
    site_name: String,
    volume_liters: String,
    volume_barrels: String,
}

#[derive(Debug, Default, Deserialize)]
struct FlashQuery {
    notice: Option<String>,
    error: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState { storage };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(index).post(submit))
        .route("/history", get(history))
        .route("/about", get(about))
        .route("/history/:id/delete", post(delete_result))
        .route("/history/:id/edit", get(edit_form).post(apply_edit))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.storage.health_check().await {
        Ok(()) => "ok".into_response(),
        Err(error) => {
            error!(%error, "health check failed");
            (axum::http::StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
        }
    }
}

async fn index() -> Html<String> {
    Html(index_page(None, "", "", None))
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> Html<String> {
    match handle_submission(&state, &form).await {
        Ok((liters, barrels)) => Html(index_page(
            Some((liters, barrels)),
            &form.location_name,
            &form.site_name,
            Some(Flash::notice("Result saved.")),
        )),
        Err(err) => Html(index_page(
            None,
            &form.location_name,
            &form.site_name,
            Some(Flash::error(err.message)),
        )),
    }
}

async fn handle_submission(state: &AppState, form: &SubmitForm) -> Result<(f64, f64), AppError> {
    let distance = parse_distance(&form.distance)?;
    let selector: Selector = form.selector.parse()?;

    // Barrels derive from the full-precision volume, not the rounded liters.
    let volume = compute_volume(distance, selector);
    let liters = round_tenth(volume);
    let barrels = round_tenth(to_barrels(volume));

    state
        .storage
        .insert(&form.location_name, &form.site_name, liters, barrels)
        .await
        .map_err(storage_failure)?;
    Ok((liters, barrels))
}

async fn history(State(state): State<Arc<AppState>>, Query(q): Query<FlashQuery>) -> Html<String> {
    let flash = flash_from_query(q.notice.as_deref(), q.error.as_deref());
    match state.storage.list_all().await {
        Ok(results) => Html(history_page(&results, flash)),
        Err(error) => {
            error!(%error, "failed to load history");
            Html(history_page(
                &[],
                Some(Flash::error("An internal error occurred.")),
            ))
        }
    }
}

async fn about() -> Html<String> {
    Html(about_page())
}

async fn delete_result(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Redirect {
    match state.storage.delete(ResultId(id)).await {
        Ok(true) => Redirect::to("/history?notice=deleted"),
        Ok(false) => Redirect::to("/history?error=not_found"),
        Err(error) => {
            error!(%error, id, "failed to delete result");
            Redirect::to("/history?error=storage")
        }
    }
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(q): Query<FlashQuery>,
) -> Response {
    let flash = flash_from_query(q.notice.as_deref(), q.error.as_deref());
    match state.storage.get(ResultId(id)).await {
        Ok(Some(result)) => Html(edit_page(&result, flash)).into_response(),
        Ok(None) => Redirect::to("/history?error=not_found").into_response(),
        Err(error) => {
            error!(%error, id, "failed to load result for editing");
            Redirect::to("/history?error=storage").into_response()
        }
    }
}

async fn apply_edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(form): Form<EditForm>,
) -> Redirect {
    // Both volumes are taken verbatim; an edit may break the liters/barrels
    // ratio, matching the store's update contract.
    let (liters, barrels) = match parse_volumes(&form.volume_liters, &form.volume_barrels) {
        Ok(values) => values,
        Err(_) => return Redirect::to(&format!("/history/{id}/edit?error=invalid_number")),
    };

    match state
        .storage
        .update(ResultId(id), &form.location_name, &form.site_name, liters, barrels)
        .await
    {
        Ok(true) => Redirect::to("/history?notice=updated"),
        Ok(false) => Redirect::to("/history?error=not_found"),
        Err(error) => {
            error!(%error, id, "failed to update result");
            Redirect::to("/history?error=storage")
        }
    }
}

fn parse_volumes(liters: &str, barrels: &str) -> Result<(f64, f64), std::num::ParseFloatError> {
    Ok((liters.trim().parse()?, barrels.trim().parse()?))
}

fn storage_failure(error: anyhow::Error) -> AppError {
    error!(%error, "storage operation failed");
    AppError::new(
        ErrorKind::OperationFailed,
        "An internal error occurred; the result was not saved.",
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

//! The HTTP interface: an axum router over the commands, and the server bootstrap.

use crate::api::{self, Mode, Spreadsheet};
use crate::error::{Error, Res};
use crate::model::Transaction;
use crate::{commands, Config, Result};
use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    spreadsheet: Arc<dyn Spreadsheet>,
}

/// `{"data": ...}`
#[derive(Debug, Serialize)]
struct Data<T> {
    data: T,
}

/// `{"results": [...]}`
#[derive(Debug, Serialize)]
struct Results<T> {
    results: Vec<T>,
}

/// Builds the router for every endpoint, backed by `spreadsheet`.
pub fn router(spreadsheet: Arc<dyn Spreadsheet>) -> Router {
    Router::new()
        .route("/sheets", get(list_sheets).post(create_sheet))
        .route(
            "/sheets/:sheet/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/sheets/:sheet/transactions/:transaction_row",
            put(update_transaction).delete(delete_transaction),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { spreadsheet })
}

/// Connects to the spreadsheet for `mode` and serves HTTP requests until Ctrl-C is pressed.
pub async fn serve(config: &Config, mode: Mode) -> Res<()> {
    let spreadsheet = api::spreadsheet(config, mode).await?;
    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(spreadsheet))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("The HTTP server failed")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => error!("Unable to listen for Ctrl-C: {e}"),
    }
}

async fn list_sheets(State(state): State<AppState>) -> Result<Json<Data<Results<String>>>> {
    let results = commands::list_sheets(state.spreadsheet.as_ref()).await?;
    Ok(Json(Data {
        data: Results { results },
    }))
}

async fn create_sheet(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode> {
    let body = json_object(body)?;
    let name = body
        .get("sheet_name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    commands::create_sheet(state.spreadsheet.as_ref(), name).await?;
    Ok(StatusCode::CREATED)
}

async fn list_transactions(
    State(state): State<AppState>,
    Path(sheet): Path<String>,
) -> Result<Json<Results<Transaction>>> {
    let results = commands::list_transactions(state.spreadsheet.as_ref(), &sheet).await?;
    Ok(Json(Results { results }))
}

async fn create_transaction(
    State(state): State<AppState>,
    Path(sheet): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<Transaction>>> {
    let body = json_object(body)?;
    let data = commands::create_transaction(state.spreadsheet.as_ref(), &sheet, &body).await?;
    Ok(Json(Data { data }))
}

async fn update_transaction(
    State(state): State<AppState>,
    Path((sheet, transaction_row)): Path<(String, String)>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<Transaction>>> {
    let body = json_object(body)?;
    let data = commands::update_transaction(
        state.spreadsheet.as_ref(),
        &sheet,
        &transaction_row,
        &body,
    )
    .await?;
    Ok(Json(Data { data }))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path((sheet, transaction_row)): Path<(String, String)>,
) -> Result<StatusCode> {
    commands::delete_transaction(state.spreadsheet.as_ref(), &sheet, &transaction_row).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accepts only a well-formed JSON object as a request body.
fn json_object(
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(Error::InvalidBody(
            "The body must be a JSON object.".to_string(),
        )),
        Err(rejection) => Err(Error::InvalidBody(rejection.body_text())),
    }
}

use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

pub async fn overlays(State(state): State<Arc<AppState>>) -> Response {
    let overlays = state.overlays.borrow().clone();
    Json(overlays.as_ref().clone()).into_response()
}

pub async fn personnel(State(state): State<Arc<AppState>>) -> Response {
    let options = state.personnel_options.borrow().to_vec();
    Json(options).into_response()
}

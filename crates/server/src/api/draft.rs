use crate::{
    dto::{DraftDto, LayerDto, SubmitDto},
    state::AppState,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bandobast::prelude::*;
use std::sync::Arc;
use tracing::{error, warn};

pub async fn draw(
    State(state): State<Arc<AppState>>,
    Json(layer): Json<DrawnLayer>,
) -> Result<Response, StatusCode> {
    let mut session = state.session.lock().await;
    match session.handle_draw(layer) {
        Ok(layer_id) => Ok(Json(LayerDto { layer_id }).into_response()),
        Err(DrawError::FormOpen) => Err(StatusCode::CONFLICT),
        Err(DrawError::Rejected(_) | DrawError::MissingCoordinates) => {
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

pub async fn draft(State(state): State<Arc<AppState>>) -> Response {
    let mut session = state.session.lock().await;
    Json(DraftDto::take(session.draw_mut())).into_response()
}

pub async fn update_draft(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FormUpdate>,
) -> Result<Response, Response> {
    let mut session = state.session.lock().await;
    let Some(mut form) = session.draw_mut().form() else {
        return Err(StatusCode::CONFLICT.into_response());
    };
    form.apply(update).map_err(|err| {
        warn!("Rejected form update: {err}");
        (StatusCode::BAD_REQUEST, err.to_string()).into_response()
    })?;
    Ok(Json(DraftDto::take(session.draw_mut())).into_response())
}

pub async fn submit(State(state): State<Arc<AppState>>) -> Result<Response, Response> {
    let mut session = state.session.lock().await;
    match session.submit().await {
        Ok(id) => Ok(Json(SubmitDto { id }).into_response()),
        Err(SubmitError::FormClosed) => Err(StatusCode::CONFLICT.into_response()),
        Err(err @ SubmitError::MissingTitle) => {
            Err((StatusCode::BAD_REQUEST, err.to_string()).into_response())
        }
        Err(err) => {
            error!("Failed to submit sector: {err}");
            Err((StatusCode::BAD_GATEWAY, err.to_string()).into_response())
        }
    }
}

pub async fn cancel(State(state): State<Arc<AppState>>) -> StatusCode {
    let mut session = state.session.lock().await;
    if session.draw_mut().cancel() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}

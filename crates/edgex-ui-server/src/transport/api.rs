//! Batch, upload and liveness endpoints.

use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use edgex_transit::{Map, TaggedValue, Value};
use tracing::{debug, info};

use crate::dispatch::{BatchOutcome, BatchRequest, tempid_result};

use super::errors::TransportError;
use super::{GatewayState, TRANSIT_CONTENT_TYPE, TRANSPORT_TARGET};

const UPLOAD_RESULT_KEY: &str = "upload";

/// `POST /api`: runs one Transit batch.
///
/// A failed operation answers `502 Bad Gateway` with only the failure
/// message; results of earlier operations are not returned.
pub(super) async fn batch(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, TransportError> {
    let batch = BatchRequest::parse(&body)?;
    debug!(target: TRANSPORT_TARGET, operations = batch.operations().len(), "batch received");

    let outcome = state.dispatcher.execute(batch).await;
    let status = match outcome {
        BatchOutcome::Done(_) => StatusCode::OK,
        BatchOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    let body = outcome.encode()?;
    Ok(transit(status, body))
}

/// `POST /file-upload`: stores the `file` part and answers with the tempid
/// remap from the client's placeholder in the `id` part to the number the
/// file was stored under.
pub(super) async fn file_upload(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Response, TransportError> {
    let remap = receive(&state, multipart).await?;
    let body = edgex_transit::encode(&remap)?;
    Ok(transit(StatusCode::OK, body))
}

/// `POST /file-uploads`: as [`file_upload`], with the remap nested under the
/// `upload` mutation symbol.
pub(super) async fn file_uploads(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Response, TransportError> {
    let remap = receive(&state, multipart).await?;
    let mut result = Map::new();
    result.insert(Value::symbol(UPLOAD_RESULT_KEY), remap);
    let body = edgex_transit::encode(&Value::Map(result))?;
    Ok(transit(StatusCode::OK, body))
}

/// `GET /ping`.
pub(super) async fn ping() -> &'static str {
    "pong"
}

async fn receive(
    state: &GatewayState,
    mut multipart: Multipart,
) -> Result<Value, TransportError> {
    let mut file: Option<Bytes> = None;
    let mut placeholder: Option<TaggedValue> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| TransportError::Upload(error.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|error| TransportError::Upload(error.body_text()))?;
        match name.as_deref() {
            Some("file") => file = Some(data),
            Some("id") => placeholder = Some(parse_placeholder(&data)?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| TransportError::Upload("missing part 'file'".to_owned()))?;
    let placeholder =
        placeholder.ok_or_else(|| TransportError::Upload("missing part 'id'".to_owned()))?;

    let id = state.uploads.store(&file).await?;
    info!(target: TRANSPORT_TARGET, id, size = file.len(), "file uploaded");
    Ok(tempid_result(placeholder, Value::Int(upload_number(id))))
}

fn parse_placeholder(data: &[u8]) -> Result<TaggedValue, TransportError> {
    let value = edgex_transit::decode(data)
        .map_err(|error| TransportError::Upload(format!("invalid id: {error}")))?;
    match value {
        Value::Tagged(tagged) => Ok(tagged),
        other => Err(TransportError::Upload(format!(
            "id must be a tagged placeholder, found {}",
            other.kind()
        ))),
    }
}

fn upload_number(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

fn transit(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, TRANSIT_CONTENT_TYPE)], body).into_response()
}

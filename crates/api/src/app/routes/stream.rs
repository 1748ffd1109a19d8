//! Realtime change feed over Server-Sent Events.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse,
    },
};
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::wrappers::UnboundedReceiverStream;

use stockdesk_events::{ChangeEvent, ChangeFilter, RecvError, Table};

use crate::app::errors;
use crate::app::services::AppServices;

/// GET /stream
///
/// Streams change events as SSE. An optional `table` query parameter
/// narrows the feed to one table; without it every change is forwarded.
/// Timeouts double as heartbeats so idle connections stay open.
pub async fn stream_changes(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let filter = match params.get("table").map(String::as_str) {
        None => ChangeFilter::any(),
        Some("products") => ChangeFilter::table(Table::Products),
        Some("movements") => ChangeFilter::table(Table::Movements),
        Some("suppliers") => ChangeFilter::table(Table::Suppliers),
        Some(other) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("unknown table: {other}"),
            )
        }
    };

    let (tx, rx) = unbounded_channel::<Result<SseEvent, std::convert::Infallible>>();

    let subscription = services.hub().subscribe(filter);
    tokio::task::spawn_blocking(move || {
        loop {
            match subscription.recv_timeout(Duration::from_secs(15)) {
                Ok(event) => {
                    if tx.send(Ok(change_to_sse(&event))).is_err() {
                        break; // client went away
                    }
                }
                Err(RecvError::Timeout) => {
                    let heartbeat = SseEvent::default().event("heartbeat").data("{}");
                    if tx.send(Ok(heartbeat)).is_err() {
                        break;
                    }
                }
                Err(RecvError::Cancelled) | Err(RecvError::Disconnected) => break,
            }
        }
        subscription.cancel();
    });

    let stream = UnboundedReceiverStream::new(rx);
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}

fn change_to_sse(event: &ChangeEvent) -> SseEvent {
    let payload = serde_json::json!({
        "table": event.table,
        "op": event.op,
        "product_id": event.product_id.map(|id| id.to_string()),
        "occurred_at": event.occurred_at.to_rfc3339(),
    });
    SseEvent::default()
        .event("change")
        .data(payload.to_string())
}

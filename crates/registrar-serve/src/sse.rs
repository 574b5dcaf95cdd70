use crate::routes::error::map_error;
use crate::AppState;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, StreamExt};
use registrar_feed::types::ChangeTable;
use tokio_stream::wrappers::BroadcastStream;

/// Replay the recorded history after `after`, then stay attached to the
/// live bus. Subscribing to the bus before reading history means no
/// change between the two can be missed, only duplicated.
pub async fn subscribe(
    state: AppState,
    after: Option<i64>,
    table: Option<ChangeTable>,
) -> Response {
    let receiver = state.bus.subscribe();
    let history = {
        let registrar = state.registrar.lock().await;
        match registrar.changes().list(after, None, table) {
            Ok(changes) => changes,
            Err(err) => return map_error(&err, None).into_response(),
        }
    };
    let last_seq = history.last().map(|change| change.seq);

    let history_stream = stream::iter(history.into_iter().map(|change| {
        let json = serde_json::to_string(&change).unwrap_or_else(|_| "{}".to_string());
        Ok::<Event, std::convert::Infallible>(Event::default().data(json))
    }));

    let live_stream = BroadcastStream::new(receiver).filter_map(move |item| async move {
        match item {
            Ok(change) => {
                if table.is_some_and(|wanted| wanted != change.table) {
                    return None;
                }
                if last_seq.is_some_and(|seq| change.seq <= seq) {
                    return None;
                }
                let json = serde_json::to_string(&change).unwrap_or_else(|_| "{}".to_string());
                Some(Ok(Event::default().data(json)))
            }
            Err(_) => None,
        }
    });

    let stream = history_stream.chain(live_stream);
    Sse::new(stream).into_response()
}

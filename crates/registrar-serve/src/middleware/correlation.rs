use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use registrar_core::RequestContext;
use registrar_feed::types::ChangeSource;
use ulid::Ulid;

const HEADER_NAME: &str = "x-correlation-id";

/// Resolve the request's correlation id, honoring one the caller sent,
/// and stash a ready `RequestContext` for handlers to pick up as an
/// extension. The id is echoed back on the response.
pub async fn correlation_middleware(mut request: Request<Body>, next: Next) -> Response {
    let header = HeaderName::from_static(HEADER_NAME);
    let id = request
        .headers()
        .get(&header)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.to_string())
        .unwrap_or_else(|| format!("corr_{}", Ulid::new()));

    request
        .extensions_mut()
        .insert(RequestContext::new(ChangeSource::Api, Some(id.clone())));
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(header, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::ServiceExt;

    async fn show_context(Extension(ctx): Extension<RequestContext>) -> String {
        format!("{:?}/{}", ctx.source, ctx.correlation_id.unwrap_or_default())
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(show_context))
            .route_layer(middleware::from_fn(correlation_middleware))
    }

    #[tokio::test]
    async fn caller_supplied_id_reaches_handler_and_response() {
        let request = Request::builder()
            .uri("/")
            .header(HEADER_NAME, "corr_caller")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(HEADER_NAME).unwrap(),
            "corr_caller"
        );
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Api/corr_caller");
    }

    #[tokio::test]
    async fn missing_id_gets_minted() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        let echoed = response
            .headers()
            .get(HEADER_NAME)
            .and_then(|value| value.to_str().ok())
            .unwrap()
            .to_string();
        assert!(echoed.starts_with("corr_"));
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body, format!("Api/{echoed}").as_bytes());
    }
}

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with an `x-request-id`, keeping one supplied by the client.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static(REQUEST_ID_HEADER);

    let req_id_value = match req.headers().get(&header_name) {
        Some(existing) => existing.clone(),
        None => {
            let generated = Uuid::new_v4().to_string();
            match HeaderValue::from_str(&generated) {
                Ok(v) => v,
                Err(_) => return next.run(req).await,
            }
        }
    };

    // Available to the trace layer when it builds the request span
    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;
    res.headers_mut().insert(header_name, req_id_value);
    res
}

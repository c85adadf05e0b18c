use axum::http::{HeaderName, HeaderValue, Method};
use roster_config::CorsConfig;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build the CORS layer from validated configuration.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins = if cors.is_wildcard_included() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors.allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok()),
        )
    };

    let methods =
        AllowMethods::list(cors.allowed_methods.iter().filter_map(|method| {
            Method::from_bytes(method.trim().as_bytes()).ok()
        }));

    let headers = if cors.allows_any_header() {
        AllowHeaders::any()
    } else {
        AllowHeaders::list(cors.allowed_headers.iter().filter_map(|header| {
            HeaderName::from_bytes(header.trim().as_bytes()).ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(cors.max_age)
}

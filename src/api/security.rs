use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
connect-src 'self' https://api.github.com https://raw.githubusercontent.com; \
img-src 'self' data: https://raw.githubusercontent.com; \
style-src 'self'; \
font-src 'self'; \
script-src 'self'; \
object-src 'none'; \
base-uri 'self'; \
frame-ancestors 'self'";

const STATIC_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("content-security-policy", CONTENT_SECURITY_POLICY),
];

/// True when the request reached us over TLS, directly or behind a proxy
fn is_secure(headers: &HeaderMap, scheme: Option<&str>) -> bool {
    if scheme == Some("https") {
        return true;
    }
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |proto| proto.starts_with("https"))
}

/// Adds the browser hardening headers to every response
pub async fn security_headers(request: Request, next: Next) -> Response {
    let secure = is_secure(request.headers(), request.uri().scheme_str());
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in STATIC_HEADERS {
        headers.insert(
            HeaderName::from_static(*name),
            HeaderValue::from_static(*value),
        );
    }
    if secure {
        headers.insert(
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    response
}

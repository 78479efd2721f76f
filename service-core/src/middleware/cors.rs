//! Cross-origin access policy.
//!
//! Origins are matched exactly against a fixed allow-list. A matching origin is
//! echoed back in `Access-Control-Allow-Origin`; anything else gets no
//! allow-origin header at all, so browsers refuse the cross-origin read.
//! Preflight (`OPTIONS`) requests for the policy's paths are answered here
//! with `204 No Content` and never reach the router. `OPTIONS` on any other
//! path falls through to routing like any other request.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
const MAX_AGE_SECONDS: &str = "86400";

#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    allowed_origins: &'static [&'static str],
    preflight_paths: &'static [&'static str],
}

impl AccessPolicy {
    pub const fn new(
        allowed_origins: &'static [&'static str],
        preflight_paths: &'static [&'static str],
    ) -> Self {
        Self {
            allowed_origins,
            preflight_paths,
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| *allowed == origin)
    }

    /// Whether an `OPTIONS` request to `path` is answered by the policy itself.
    pub fn answers_preflight(&self, path: &str) -> bool {
        self.preflight_paths.iter().any(|p| *p == path)
    }

    /// Attach the policy headers for a request that declared `origin`.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if let Some(origin) = origin.filter(|o| o.to_str().is_ok_and(|o| self.allows(o))) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }

        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECONDS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

pub async fn access_policy_middleware(
    State(policy): State<AccessPolicy>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers().get(header::ORIGIN).cloned();

    let mut response = if req.method() == Method::OPTIONS
        && policy.answers_preflight(req.uri().path())
    {
        tracing::debug!(uri = %req.uri(), "Answering preflight request");
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    policy.apply(origin.as_ref(), response.headers_mut());
    response
}

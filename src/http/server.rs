//! Router construction.
//!
//! One router instance is built per process and cloned into each listener;
//! there is no global route registration.

use std::time::Duration;

use axum::{middleware, Router};
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::http::request::request_logging;
use crate::reflection::reflect;

/// Build the router: the logging middleware around the reflection handler,
/// answering every method on every path.
#[allow(deprecated)]
pub fn build_router(config: &ServerConfig) -> Router {
    let mut router = Router::new().fallback(reflect);

    // Inside the logging layer so timed-out responses still carry a Request-ID.
    if let Some(secs) = config.timeouts.request_secs {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
    }

    router.layer(middleware::from_fn(request_logging))
}

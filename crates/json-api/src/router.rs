//! App Router

use std::sync::Arc;

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    size_limiter::max_size,
    trailing_slash::remove_slash,
};

use crate::{
    auth, healthcheck,
    observability::{metrics_handler, request_logging},
    passes,
    state::State,
};

/// Largest request body the API accepts.
pub(crate) const MAX_REQUEST_BODY_BYTES: u64 = 8 * 1024 * 1024;

const OPENAPI_PATH: &str = "/api-doc/openapi.json";

/// Authenticated pass record routes.
pub(crate) fn api_router() -> Router {
    Router::with_path("api/v1")
        .hoop(max_size(MAX_REQUEST_BODY_BYTES))
        .hoop(auth::middleware::handler)
        .push(Router::with_path("query-passed").post(passes::query::handler))
        .push(Router::with_path("publish").post(passes::publish::handler))
}

/// Every route the server exposes, including the generated API docs.
pub(crate) fn service_router(state: Arc<State>) -> Router {
    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(request_logging)
        .hoop(remove_slash())
        .hoop(inject(state))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(api_router());

    let doc = OpenApi::new("dryci API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    router
        .push(doc.into_router(OPENAPI_PATH))
        .push(SwaggerUi::new(OPENAPI_PATH).into_router("docs"))
}

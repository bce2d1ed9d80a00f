//! HTTP span and metric labels.

/// Paths served by the router. Every other path shares one label.
const KNOWN_ROUTES: [&str; 5] = [
    "/healthcheck",
    "/api/v1/query-passed",
    "/api/v1/publish",
    "/api-doc/openapi.json",
    "/docs",
];

const UNMATCHED_ROUTE: &str = "{unmatched}";

pub(super) fn route_label(path: &str) -> &'static str {
    let trimmed = path.trim_end_matches('/');

    KNOWN_ROUTES
        .iter()
        .find(|route| **route == trimmed)
        .copied()
        .unwrap_or(UNMATCHED_ROUTE)
}

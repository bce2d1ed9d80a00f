//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};

use dryci_app::domain::{passes::MockPassesService, users::records::UserId};

use crate::{auth, state::State};

pub(crate) const TEST_TOKEN: &str = "dryci-testtoken";

pub(crate) const TEST_AUTHORIZATION: &str = "Bearer dryci-testtoken";

pub(crate) fn dep_hash(c: char) -> String {
    c.to_string().repeat(64)
}

pub(crate) fn node_id(c: char) -> String {
    c.to_string().repeat(32)
}

/// Mock that fails the test if any call reaches it.
pub(crate) fn strict_passes_mock() -> MockPassesService {
    let mut passes = MockPassesService::new();

    passes.expect_authenticate().never();
    passes.expect_query_passed().never();
    passes.expect_publish_passed().never();

    passes
}

/// Mock that resolves `TEST_TOKEN`. Other calls need their own expectations.
pub(crate) fn authenticated_passes_mock() -> MockPassesService {
    let mut passes = MockPassesService::new();

    passes
        .expect_authenticate()
        .withf(|token| token == TEST_TOKEN)
        .returning(|_| Ok(UserId::from_i64(1)));

    passes
}

/// Serve `route` behind the bearer middleware with `passes` as the backend.
pub(crate) fn passes_service(passes: MockPassesService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(State::shared(Arc::new(passes))))
            .hoop(auth::middleware::handler)
            .push(route),
    )
}

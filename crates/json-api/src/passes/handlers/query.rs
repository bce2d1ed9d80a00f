//! Query Passed Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, passes::errors::into_status_error, state::State};

/// Query Passed Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QueryPassedRequest {
    /// Dependency hashes (64 hex characters) to look up.
    pub test_file_hashes: Vec<String>,
}

/// Query Passed Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QueryPassedResponse {
    /// Passed node ids for each requested hash, in request order.
    pub node_ids: Vec<Vec<String>>,
}

/// Query Passed Handler
#[endpoint(
    tags("passes"),
    summary = "Look up node ids known to pass",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Node ids per dependency hash"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed dependency hash"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid, expired or disabled token"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage busy, retry later"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<QueryPassedRequest>,
    depot: &mut Depot,
) -> Result<Json<QueryPassedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let token = depot.bearer_token_or_401()?;

    let node_ids = state
        .passes
        .query_passed(token, json.into_inner().test_file_hashes)
        .await
        .map_err(into_status_error)?;

    Ok(Json(QueryPassedResponse { node_ids }))
}

#[cfg(test)]
mod tests {
    use salvo::{
        http::header::{AUTHORIZATION, CONTENT_TYPE},
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;

    use dryci_app::domain::passes::{
        MockPassesService, PassesError, PassesServiceError, UnauthorizedReason,
    };

    use crate::test_helpers::{
        TEST_AUTHORIZATION, TEST_TOKEN, authenticated_passes_mock, dep_hash, node_id,
        passes_service, strict_passes_mock,
    };

    use super::*;

    const URL: &str = "http://example.com/api/v1/query-passed";

    fn make_service(passes: MockPassesService) -> Service {
        passes_service(passes, Router::with_path("api/v1/query-passed").post(handler))
    }

    #[tokio::test]
    async fn test_query_returns_node_ids_in_request_order() -> TestResult {
        let mut passes = authenticated_passes_mock();

        passes
            .expect_query_passed()
            .once()
            .withf(|token, hashes| token == TEST_TOKEN && *hashes == [dep_hash('b'), dep_hash('a')])
            .return_once(|_, _| Ok(vec![vec![], vec![node_id('1'), node_id('2')]]));

        passes.expect_publish_passed().never();

        let mut res = TestClient::post(URL)
            .add_header(AUTHORIZATION, TEST_AUTHORIZATION, true)
            .json(&json!({ "test_file_hashes": [dep_hash('b'), dep_hash('a')] }))
            .send(&make_service(passes))
            .await;

        let body: QueryPassedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body.node_ids,
            vec![vec![], vec![node_id('1'), node_id('2')]]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_query_without_token_never_reaches_service() -> TestResult {
        let res = TestClient::post(URL)
            .json(&json!({ "test_file_hashes": [dep_hash('a')] }))
            .send(&make_service(strict_passes_mock()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_query_with_disabled_token_returns_401() -> TestResult {
        let mut passes = authenticated_passes_mock();

        passes
            .expect_query_passed()
            .once()
            .return_once(|_, _| {
                Err(PassesServiceError::Unauthorized(
                    UnauthorizedReason::Disabled,
                ))
            });

        passes.expect_publish_passed().never();

        let res = TestClient::post(URL)
            .add_header(AUTHORIZATION, TEST_AUTHORIZATION, true)
            .json(&json!({ "test_file_hashes": [dep_hash('a')] }))
            .send(&make_service(passes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_query_with_short_hash_returns_400() -> TestResult {
        let mut passes = authenticated_passes_mock();

        passes
            .expect_query_passed()
            .once()
            .return_once(|_, _| {
                Err(PassesServiceError::InvalidInput(
                    PassesError::InvalidDepHash,
                ))
            });

        passes.expect_publish_passed().never();

        let res = TestClient::post(URL)
            .add_header(AUTHORIZATION, TEST_AUTHORIZATION, true)
            .json(&json!({ "test_file_hashes": ["a".repeat(63)] }))
            .send(&make_service(passes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_query_when_storage_busy_returns_503() -> TestResult {
        let mut passes = authenticated_passes_mock();

        passes
            .expect_query_passed()
            .once()
            .return_once(|_, _| Err(PassesServiceError::Unavailable));

        passes.expect_publish_passed().never();

        let res = TestClient::post(URL)
            .add_header(AUTHORIZATION, TEST_AUTHORIZATION, true)
            .json(&json!({ "test_file_hashes": [dep_hash('a')] }))
            .send(&make_service(passes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }

    #[tokio::test]
    async fn test_query_with_malformed_body_returns_400() -> TestResult {
        let mut passes = authenticated_passes_mock();

        passes.expect_query_passed().never();
        passes.expect_publish_passed().never();

        let res = TestClient::post(URL)
            .add_header(AUTHORIZATION, TEST_AUTHORIZATION, true)
            .json(&json!({ "hashes": "not a list" }))
            .send(&make_service(passes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_query_with_bad_token_and_broken_body_returns_401() -> TestResult {
        let mut passes = MockPassesService::new();

        passes
            .expect_authenticate()
            .once()
            .withf(|token| token == "dryci-bogus")
            .return_once(|_| {
                Err(PassesServiceError::Unauthorized(
                    UnauthorizedReason::InvalidToken,
                ))
            });

        passes.expect_query_passed().never();
        passes.expect_publish_passed().never();

        let res = TestClient::post(URL)
            .add_header(AUTHORIZATION, "Bearer dryci-bogus", true)
            .text("{not json")
            .add_header(CONTENT_TYPE, "application/json", true)
            .send(&make_service(passes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}

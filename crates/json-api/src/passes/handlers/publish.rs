//! Publish Passed Handler

use std::{collections::BTreeMap, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use dryci_app::domain::passes::data::{NewPublish, RunSummary};

use crate::{extensions::*, passes::errors::into_status_error, state::State};

/// Publish Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PublishRequest {
    /// Node ids (32 hex characters) that passed, keyed by dependency hash.
    pub passed_node_ids_per_test_file: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub total_test_count: u64,

    #[serde(default)]
    pub passed_test_count: u64,

    #[serde(default)]
    pub failed_test_count: u64,

    #[serde(default)]
    pub skipped_test_count: u64,

    #[serde(default)]
    pub skipped_by_cache_test_count: u64,
}

impl From<PublishRequest> for NewPublish {
    fn from(request: PublishRequest) -> Self {
        NewPublish {
            passed_node_ids: request.passed_node_ids_per_test_file,
            summary: RunSummary {
                total: request.total_test_count,
                passed: request.passed_test_count,
                failed: request.failed_test_count,
                skipped: request.skipped_test_count,
                skipped_by_cache: request.skipped_by_cache_test_count,
            },
        }
    }
}

/// Publish Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PublishResponse {}

/// Publish Passed Handler
///
/// Acknowledges once the publish is validated and queued. Stored records
/// reflect it after the next pipeline flush.
#[endpoint(
    tags("passes"),
    summary = "Publish node ids that passed",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Publish accepted for processing"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed dependency hash or node id"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid, expired or disabled token"),
        (status_code = StatusCode::PAYLOAD_TOO_LARGE, description = "Too many node ids for one dependency hash"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Write queue full, retry later"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PublishRequest>,
    depot: &mut Depot,
) -> Result<Json<PublishResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let token = depot.bearer_token_or_401()?;

    state
        .passes
        .publish_passed(token, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(PublishResponse {}))
}

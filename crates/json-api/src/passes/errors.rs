//! Pass Record Errors

use salvo::http::StatusError;
use tracing::error;

use dryci_app::domain::passes::PassesServiceError;

pub(crate) const UNAVAILABLE_BRIEF: &str = "Service temporarily unavailable, retry later";

pub(crate) fn into_status_error(error: PassesServiceError) -> StatusError {
    match error {
        PassesServiceError::Unauthorized(reason) => StatusError::unauthorized().brief(reason.brief()),
        PassesServiceError::InvalidInput(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PassesServiceError::QuotaExceeded(source) => {
            StatusError::payload_too_large().brief(source.to_string())
        }
        PassesServiceError::Unavailable => {
            StatusError::service_unavailable().brief(UNAVAILABLE_BRIEF)
        }
        PassesServiceError::Internal(source) => {
            error!(error = ?source, "pass record request failed");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use dryci_app::domain::passes::{PassesError, UnauthorizedReason};
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn unauthorized_reasons_keep_fixed_briefs() {
        let expired = into_status_error(PassesServiceError::Unauthorized(UnauthorizedReason::Expired));

        assert_eq!(expired.code, StatusCode::UNAUTHORIZED);
        assert_eq!(expired.brief, "Token expired");
    }

    #[test]
    fn internal_errors_hide_detail() {
        let error = into_status_error(PassesServiceError::Internal(PassesError::Corrupt { len: 7 }));

        assert_eq!(error.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!error.brief.contains('7'), "blob length must not leak");
    }

    #[test]
    fn client_and_retryable_failures_use_distinct_statuses() {
        let invalid = into_status_error(PassesServiceError::InvalidInput(PassesError::InvalidNodeId));
        let quota = into_status_error(PassesServiceError::QuotaExceeded(
            PassesError::QuotaExceeded { count: 32_769 },
        ));
        let unavailable = into_status_error(PassesServiceError::Unavailable);

        assert_eq!(invalid.code, StatusCode::BAD_REQUEST);
        assert_eq!(quota.code, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(unavailable.code, StatusCode::SERVICE_UNAVAILABLE);
    }
}

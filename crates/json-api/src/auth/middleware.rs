//! Auth middleware.
//!
//! Resolves the bearer credential before any handler reads the request body.
//! The passes service checks it again inside the request's own transaction.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::debug;

use crate::{extensions::*, passes::errors::into_status_error, state::State};

pub(crate) const MISSING_BEARER_BRIEF: &str = "Missing or invalid Authorization header";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req).map(str::to_owned) else {
        res.render(StatusError::unauthorized().brief(MISSING_BEARER_BRIEF));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => Arc::clone(state),
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();

            return;
        }
    };

    if let Err(auth_error) = state.passes.authenticate(&token).await {
        debug!(error = %auth_error, "bearer token rejected");

        res.render(into_status_error(auth_error));
        ctrl.skip_rest();

        return;
    }

    depot.insert_bearer_token(token);

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

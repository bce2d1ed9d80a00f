//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

const BEARER_TOKEN_KEY: &str = "bearer_token";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_bearer_token(&mut self, token: String);

    /// The credential the auth middleware pulled from the request.
    fn bearer_token_or_401(&self) -> Result<&str, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_bearer_token(&mut self, token: String) {
        self.insert(BEARER_TOKEN_KEY, token);
    }

    fn bearer_token_or_401(&self) -> Result<&str, StatusError> {
        self.get::<String>(BEARER_TOKEN_KEY)
            .map(String::as_str)
            .map_err(|_missing| StatusError::unauthorized())
    }
}

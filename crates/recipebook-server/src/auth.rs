use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

use crate::error::{ApiError, ServerError, ServerResult};

/// The signed-in account behind a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub account_id: String,
}

impl Identity {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

/// Resolves request credentials to an account.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
}

/// Accepts a fixed set of bearer tokens, each bound to one account.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenAuth {
    tokens: BTreeMap<String, String>,
}

impl StaticTokenAuth {
    pub fn new(tokens: BTreeMap<String, String>) -> Self {
        Self { tokens }
    }

    pub fn with_token(mut self, token: impl Into<String>, account_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), account_id.into());
        self
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) => self
                .tokens
                .get(token)
                .map(Identity::new)
                .ok_or_else(|| ServerError::AuthFailed("unknown token".into())),
            Credentials::Anonymous => Err(ServerError::AuthFailed("no credentials".into())),
        }
    }
}

/// Extractor for handlers that require a signed-in account.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<dyn AuthProvider>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = Arc::<dyn AuthProvider>::from_ref(state);
        let credentials = credentials(parts)?;
        provider
            .authenticate(&credentials)
            .await
            .map(AuthUser)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))
    }
}

fn credentials(parts: &Parts) -> Result<Credentials, ApiError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(Credentials::Anonymous);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid Authorization header".into()))?;
    value
        .strip_prefix("Bearer ")
        .map(|token| Credentials::Bearer(token.trim().to_string()))
        .ok_or_else(|| ApiError::Unauthorized("invalid Authorization header format".into()))
}

//! Bearer credential resolution.
//!
//! Issuing and verifying credentials happens outside this crate. Handlers
//! only see the [`UserId`] an [`ActorResolver`] maps the bearer token to.

use super::error::ApiError;
use crate::task::domain::UserId;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Maps a bearer token to the acting user.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// Returns the user the token belongs to, or `None` when it is unknown.
    async fn resolve(&self, token: &str) -> Option<UserId>;
}

/// Resolver backed by a fixed token table.
#[derive(Clone, Default)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenResolver {
    /// Creates a resolver that knows no tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` for `user_id`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }

    /// Creates a resolver from configured bindings.
    #[must_use]
    pub fn from_bindings(bindings: &[TokenBinding]) -> Self {
        bindings.iter().fold(Self::new(), |resolver, binding| {
            resolver.with_token(binding.token.clone(), binding.user_id)
        })
    }

    /// Returns the number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` when no tokens are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Debug for StaticTokenResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenResolver")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

#[async_trait]
impl ActorResolver for StaticTokenResolver {
    async fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).copied()
    }
}

/// A `TOKEN=USER_UUID` pair accepted on the command line.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenBinding {
    token: String,
    user_id: UserId,
}

impl TokenBinding {
    /// Creates a binding.
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }

    /// Returns the bound user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl fmt::Debug for TokenBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBinding")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Error returned for a malformed `TOKEN=USER_UUID` pair.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenBindingError {
    /// The value has no `=` separator or an empty token.
    #[error("expected TOKEN=USER_UUID")]
    MissingSeparator,
    /// The user part is not a UUID.
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}

impl FromStr for TokenBinding {
    type Err = TokenBindingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (token, user) = raw
            .split_once('=')
            .filter(|(token, _)| !token.trim().is_empty())
            .ok_or(TokenBindingError::MissingSeparator)?;
        let uuid = Uuid::parse_str(user.trim())
            .map_err(|_| TokenBindingError::InvalidUserId(user.trim().to_owned()))?;
        Ok(Self::new(token.trim(), UserId::from_uuid(uuid)))
    }
}

/// The authenticated user making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    Arc<dyn ActorResolver>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let resolver = Arc::<dyn ActorResolver>::from_ref(state);
        resolver
            .resolve(token)
            .await
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized("unknown bearer credential".to_owned()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer credential".to_owned()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("malformed authorization header".to_owned()))?;
    value
        .split_once(' ')
        .filter(|(scheme, token)| scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty())
        .map(|(_, token)| token.trim())
        .ok_or_else(|| ApiError::Unauthorized("authorization scheme must be Bearer".to_owned()))
}

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Account role
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// The authenticated principal of a request.
///
/// Inserted into request extensions by
/// [`optional_jwt_auth_middleware`](super::optional_jwt_auth_middleware).
/// Taking `Actor` as a handler argument makes the route require a login (401 otherwise);
/// `Option<Actor>` keeps it public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners and admins may touch a user-owned resource.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authorized to access this route".to_string()))
    }
}

impl<S> OptionalFromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Actor>().cloned())
    }
}

/// An [`Actor`] with the admin role. Rejects with 401 when anonymous, 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminActor(pub Actor);

impl<S> FromRequestParts<S> for AdminActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = <Actor as FromRequestParts<S>>::from_request_parts(parts, state).await?;

        if !actor.is_admin() {
            return Err(AppError::Forbidden(format!(
                "User role {} is not authorized to access this route",
                actor.role
            )));
        }

        Ok(AdminActor(actor))
    }
}

/// Resources with a public/hidden switch.
///
/// Admins see every resource; everyone else only sees public ones.
pub trait Visible {
    fn is_public(&self) -> bool;

    fn is_visible_to(&self, actor: Option<&Actor>) -> bool {
        self.is_public() || actor.is_some_and(Actor::is_admin)
    }
}

/// Whether listings for `actor` must be restricted to public resources.
pub fn public_only(actor: Option<&Actor>) -> bool {
    !actor.is_some_and(Actor::is_admin)
}

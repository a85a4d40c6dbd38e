use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    repo_types::User,
    session::{extract_session_token, SessionKeys},
};
use crate::{error::AppError, state::AppState};

pub const SIGN_IN_PATH: &str = "/sign-in";
pub const HOME_PATH: &str = "/";

/// The signed-in user id, if the request carries a valid session.
pub struct CurrentUser(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_session_token(&parts.headers) else {
            return Ok(CurrentUser(None));
        };
        let keys = SessionKeys::from_ref(state);
        match keys.verify(&token) {
            Ok(claims) => Ok(CurrentUser(Some(claims.sub))),
            Err(e) => {
                debug!(error = %e, "ignoring invalid session");
                Ok(CurrentUser(None))
            }
        }
    }
}

/// Requires a session; otherwise redirects to the sign-in page.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = match CurrentUser::from_request_parts(parts, state).await {
            Ok(current) => current,
            Err(never) => match never {},
        };
        user.map(AuthUser)
            .ok_or_else(|| Redirect::to(SIGN_IN_PATH))
    }
}

/// Requires a session whose user is an admin; everyone else goes home.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user_id) = match CurrentUser::from_request_parts(parts, state).await {
            Ok(current) => current,
            Err(never) => match never {},
        };
        let Some(user_id) = user_id else {
            return Err(Redirect::to(HOME_PATH).into_response());
        };

        match state.users.find_by_id(user_id).await {
            Ok(Some(user)) if user.is_admin => Ok(AdminUser(user)),
            Ok(_) => {
                warn!(%user_id, "admin access denied");
                Err(Redirect::to(HOME_PATH).into_response())
            }
            Err(e) => Err(AppError::from(e).into_response()),
        }
    }
}

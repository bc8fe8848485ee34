//! Signup and login
//!
//! Both return a signed token together with the user it identifies. Neither
//! requires an authenticated context.

use async_graphql::SimpleObject;

use super::prelude::*;

/// Token and user returned after successful authentication
#[derive(Debug, SimpleObject)]
pub struct AuthPayload {
    /// Bearer token for the Authorization header
    pub token: String,
    pub user: User,
}

#[derive(Default)]
pub struct AuthMutations;

#[Object]
impl AuthMutations {
    /// Create an account
    async fn signup(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        name: String,
    ) -> Result<AuthPayload> {
        let db = ctx.data_unchecked::<Database>();
        let auth = ctx.data_unchecked::<AuthConfig>();

        let password_hash = auth.hash_password(&password).extend()?;
        let user = db
            .users()
            .create(CreateUser {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(ApiError::from)
            .extend()?;

        tracing::info!(user_id = user.id, "User signed up");

        let token = auth.issue_token(user.id).extend()?;
        Ok(AuthPayload { token, user })
    }

    /// Exchange email and password for a token
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<AuthPayload> {
        let db = ctx.data_unchecked::<Database>();
        let auth = ctx.data_unchecked::<AuthConfig>();

        let user = db
            .users()
            .find_by_email(&email)
            .await
            .map_err(ApiError::from)
            .extend()?
            .ok_or(ApiError::InvalidCredentials)
            .extend()?;

        if !auth.verify_password(&password, &user.password_hash).extend()? {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(ApiError::InvalidCredentials.extend());
        }

        let token = auth.issue_token(user.id).extend()?;
        Ok(AuthPayload { token, user })
    }
}

use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// The authenticated user, or null without a valid token
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(auth) = ctx.try_auth_user() else {
            return Ok(None);
        };
        let db = ctx.data_unchecked::<Database>();
        db.users()
            .get(auth.user_id)
            .await
            .map_err(ApiError::from)
            .extend()
    }
}

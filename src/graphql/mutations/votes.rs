use super::prelude::*;

#[derive(Default)]
pub struct VoteMutations;

#[Object]
impl VoteMutations {
    /// Vote for a link as the authenticated user
    async fn vote(&self, ctx: &Context<'_>, link_id: i32) -> Result<Option<Vote>> {
        let user = ctx.require_user("vote").extend()?;
        let db = ctx.data_unchecked::<Database>();

        let vote = db
            .votes()
            .create(link_id, user.user_id)
            .await
            .map_err(ApiError::from)
            .extend()?;

        tracing::info!(link_id, user_id = user.user_id, "Vote recorded");
        Ok(Some(vote))
    }
}

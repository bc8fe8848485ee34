use super::prelude::*;

#[derive(Default)]
pub struct LinkMutations;

#[Object]
impl LinkMutations {
    /// Post a new link as the authenticated user
    async fn post(&self, ctx: &Context<'_>, description: String, url: String) -> Result<Link> {
        let user = ctx.require_user("post").extend()?;
        let db = ctx.data_unchecked::<Database>();

        let link = db
            .links()
            .create(CreateLink {
                description,
                url,
                posted_by_id: Some(user.user_id),
            })
            .await
            .map_err(ApiError::from)
            .extend()?;

        tracing::info!(link_id = link.id, user_id = user.user_id, "Link posted");
        Ok(link)
    }
}

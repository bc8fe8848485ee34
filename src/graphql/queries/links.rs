use super::prelude::*;

#[derive(Default)]
pub struct LinkQueries;

#[Object]
impl LinkQueries {
    /// A page of links, optionally filtered by a substring of the
    /// description or url, plus the number of links matching the filter.
    async fn feed(
        &self,
        ctx: &Context<'_>,
        filter: Option<String>,
        skip: Option<i32>,
        take: Option<i32>,
        order_by: Option<Vec<LinkOrderByInput>>,
    ) -> Result<Feed> {
        let db = ctx.data_unchecked::<Database>();
        let args = FeedArgs {
            filter,
            skip,
            take,
            order_by,
        };
        let filter = LinkWhere::contains(args.filter.as_deref());
        let order_by = args.order_by.as_deref().unwrap_or_default();
        let links_repo = db.links();

        let (links, count) = tokio::try_join!(
            links_repo.find_many(&filter, order_by, args.skip, args.take),
            links_repo.count(&filter),
        )
        .map_err(ApiError::from)
        .extend()?;

        tracing::debug!(returned = links.len(), count, "Feed resolved");

        Ok(Feed {
            links,
            count: i32::try_from(count).unwrap_or(i32::MAX),
            id: Some(args.cache_key()),
        })
    }

    /// Get a link by id
    async fn link(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Link>> {
        let db = ctx.data_unchecked::<Database>();
        db.links().get(id).await.map_err(ApiError::from).extend()
    }
}

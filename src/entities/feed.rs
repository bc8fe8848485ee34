use async_graphql::{ID, SimpleObject};
use serde::Serialize;

use super::link::{Link, LinkOrderByInput};

/// One page of links plus the total number of links matching the filter.
#[derive(SimpleObject, Clone, Debug)]
pub struct Feed {
    pub links: Vec<Link>,
    pub count: i32,
    pub id: Option<ID>,
}

/// Arguments of the `feed` query.
///
/// Serialises with keys in declaration order and unset arguments omitted,
/// which makes the JSON form usable as a stable feed identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<LinkOrderByInput>>,
}

impl FeedArgs {
    pub const ID_PREFIX: &'static str = "main-feed:";

    /// `main-feed:` followed by the JSON form of the arguments.
    pub fn cache_key(&self) -> ID {
        // Only strings, integers and closed enums; serialisation cannot fail.
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        ID(format!("{}{}", Self::ID_PREFIX, json))
    }
}

//! Built-in video list queries
//!
//! Each function binds the fixed filters of one operation into a
//! [`ListCall`] once, at construction. Records are left as untyped JSON.

use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::pagination::ListCall;
use crate::types::JsonValue;

/// Parts requested for video resources
pub const VIDEO_PARTS: &str = "id,snippet,statistics";

/// Parts requested for search results
pub const SEARCH_PARTS: &str = "id,snippet";

/// Result type forced on related-video searches
const RELATED_RESULT_TYPE: &str = "video";

/// Currently most popular videos
pub fn most_popular(client: &ApiClient) -> Result<ListCall<JsonValue>> {
    Ok(ListCall::new(client.clone(), "videos")?
        .param("part", VIDEO_PARTS)
        .param("chart", "mostPopular"))
}

/// Search results for the config's query text
///
/// A related entity restricts results to videos.
pub fn search(client: &ApiClient, config: &QueryConfig) -> Result<ListCall<JsonValue>> {
    let mut call = ListCall::new(client.clone(), "search")?.param("part", SEARCH_PARTS);

    if let Some(query) = config.query() {
        call = call.param("q", query);
    }
    if let Some(related) = config.related_entity_id() {
        call = call
            .param("relatedToVideoId", related)
            .param("type", RELATED_RESULT_TYPE);
    }
    Ok(call)
}

/// Videos by id
pub fn by_ids<S: AsRef<str>>(client: &ApiClient, ids: &[S]) -> Result<ListCall<JsonValue>> {
    let ids: Vec<&str> = ids
        .iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(Error::missing_field("ids"));
    }

    Ok(ListCall::new(client.clone(), "videos")?
        .param("part", VIDEO_PARTS)
        .param("id", ids.join(",")))
}

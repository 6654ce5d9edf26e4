use tracing::debug;

use super::client::ProductGateway;
use super::dto::SearchResponse;
use crate::{
    cache::{search_key, SEARCH_TTL},
    error::ApiError,
    state::AppState,
};

/// Text search memoized for [`SEARCH_TTL`]. Concurrent misses on one key may
/// both reach the provider; the later write wins.
pub async fn search_products(
    st: &AppState,
    query: &str,
    page: u32,
    page_size: u32,
) -> Result<SearchResponse, ApiError> {
    let gw = ProductGateway::new(&st.http, &st.config.openfood);
    let key = search_key(
        query,
        page,
        page_size,
        gw.region().code(),
        gw.primary_base(),
    );

    if let Some(hit) = st.search_cache.get(&key) {
        debug!(%key, "search cache hit");
        return Ok(hit);
    }

    let fresh = gw.search_by_text(query, page, page_size).await?;
    st.search_cache.put(key, fresh.clone(), SEARCH_TTL);
    Ok(fresh)
}

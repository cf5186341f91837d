use tracing::debug;

use crate::domain::{
    error::RosterError,
    models::Player,
    ports::PlayerStore,
    query::{Page, PageRequest, PlayerPredicate, SortOrder},
};

/// Runs a filtered, ordered query for one page. Pages past the end come back
/// empty with the real total.
pub async fn fetch_page(
    store: &dyn PlayerStore,
    predicate: &PlayerPredicate,
    order: SortOrder,
    page: PageRequest,
) -> Result<Page<Player>, RosterError> {
    debug!(
        "Fetching page {} (size {}) ordered by {:?} {:?} with {} clauses",
        page.page,
        page.size,
        order.field,
        order.direction,
        predicate.clauses.len()
    );

    let (content, total_elements) = store.query(predicate, order, page).await?;

    Ok(Page {
        content,
        total_elements,
        page: page.page,
        size: page.size,
    })
}

//! Draining cursor-paginated list endpoints
//!
//! [`paginate`] turns a page fetcher into a lazy stream of items. Pages are
//! requested only as the stream is consumed, items keep their order, and
//! each call starts again from the first page.
//!
//! A failed page fetch ends the stream with that error; items already
//! yielded stay yielded. A cursor the service hands back twice ends the
//! stream with [`CoreError::PaginationCycleDetected`].

use crate::api::{ApiError, ContainerEngineApi, NodePoolFilter, NodePoolSummary, Page};
use crate::error::{CoreError, Result};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use tracing::{debug, warn};

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

enum Next {
    Start,
    Cursor(String),
    Cycle(String),
    Done,
}

struct State<F, T> {
    fetch: F,
    buffer: VecDeque<T>,
    next: Next,
    seen: HashSet<String>,
    pages: usize,
}

/// Stream every item of a cursor-paginated listing
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's `next_cursor` afterwards, until a page comes back without one.
///
/// # Example
///
/// ```rust,ignore
/// use futures::TryStreamExt;
///
/// let pools: Vec<_> = paginate(|cursor| async move {
///     client.list_node_pools(&filter, cursor.as_deref()).await
/// })
/// .try_collect()
/// .await?;
/// ```
pub fn paginate<T, F, Fut>(fetch: F) -> impl Stream<Item = Result<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = std::result::Result<Page<T>, ApiError>>,
{
    let state = State {
        fetch,
        buffer: VecDeque::new(),
        next: Next::Start,
        seen: HashSet::new(),
        pages: 0,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.buffer.pop_front() {
                return Some((Ok(item), state));
            }

            let cursor = match std::mem::replace(&mut state.next, Next::Done) {
                Next::Done => return None,
                Next::Cycle(cursor) => {
                    warn!(cursor = %cursor, "List endpoint repeated a page cursor");
                    return Some((Err(CoreError::PaginationCycleDetected { cursor }), state));
                }
                Next::Start => None,
                Next::Cursor(cursor) => Some(cursor),
            };

            let page = match (state.fetch)(cursor).await {
                Ok(page) => page,
                Err(e) => return Some((Err(CoreError::Transport(e)), state)),
            };

            state.pages += 1;
            debug!(
                page = state.pages,
                items = page.items.len(),
                more = page.next_cursor.is_some(),
                "Fetched page"
            );

            state.buffer.extend(page.items);
            state.next = match page.next_cursor {
                None => Next::Done,
                Some(cursor) if !state.seen.insert(cursor.clone()) => Next::Cycle(cursor),
                Some(cursor) => Next::Cursor(cursor),
            };
        }
    })
}

/// Stream every node pool matching `filter`, `page_size` at a time
///
/// The filter is reused unchanged for every page; only the cursor changes.
pub fn list_node_pools<'a, A>(
    api: &'a A,
    filter: NodePoolFilter,
    page_size: u32,
) -> BoxStream<'a, Result<NodePoolSummary>>
where
    A: ContainerEngineApi + ?Sized,
{
    if page_size == 0 {
        return stream::once(async {
            Err(CoreError::Validation(
                "page size must be greater than zero".to_string(),
            ))
        })
        .boxed();
    }

    let filter = NodePoolFilter {
        limit: Some(page_size),
        ..filter
    };

    paginate(move |cursor| {
        let filter = filter.clone();
        async move { api.list_node_pools(&filter, cursor.as_deref()).await }
    })
    .boxed()
}

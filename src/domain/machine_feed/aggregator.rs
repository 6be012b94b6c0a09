use std::cmp::Reverse;

use super::model::{FeedItem, PageRequest, Paginated};

/// Combine repairs and sessions into one feed, newest first.
///
/// The sort is stable: items with equal timestamps keep their order from the
/// repairs-then-sessions concatenation. Items with unparseable timestamps go
/// last.
pub fn merge(repairs: Vec<FeedItem>, sessions: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut feed = repairs;
    feed.extend(sessions);
    feed.sort_by_cached_key(|item| Reverse(item.sort_key()));
    feed
}

/// Cut one page out of `items`.
///
/// A page past the end yields no items rather than an error.
pub fn paginate<T>(mut items: Vec<T>, request: PageRequest) -> Paginated<T> {
    let total_items = items.len();
    let start = request.offset();

    let page_items = if start >= total_items {
        Vec::new()
    } else {
        let end = start.saturating_add(request.size()).min(total_items);
        items.truncate(end);
        items.split_off(start)
    };

    Paginated {
        items: page_items,
        page: request.page(),
        size: request.size(),
        total_pages: total_items.div_ceil(request.size()),
        total_items,
    }
}

pub fn aggregate(
    repairs: Vec<FeedItem>,
    sessions: Vec<FeedItem>,
    request: PageRequest,
) -> Paginated<FeedItem> {
    paginate(merge(repairs, sessions), request)
}

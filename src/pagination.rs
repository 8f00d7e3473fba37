//! Page-number windows, clamped navigation and the paginated wire shape.

use serde::{Deserialize, Serialize};

/// Total page count up to which every page link is shown without compression.
pub const FULL_WINDOW_LIMIT: usize = 7;

/// Pages shown on each side of the current page in a compressed window.
pub const DEFAULT_WINDOW_SIZE: usize = 1;

/// Ordered page links to render. `None` marks an ellipsis.
pub type PageWindow = Vec<Option<usize>>;

/// Builds the page links for `current_page` out of `last_page`.
///
/// `current_page` is clamped into `[1, last_page]` first. Up to
/// [`FULL_WINDOW_LIMIT`] pages every page is listed; above that the window
/// keeps the first and last page plus `window_size` neighbours of the current
/// page, with an ellipsis standing in for each gap.
pub fn build_window(current_page: usize, last_page: usize, window_size: usize) -> PageWindow {
    let last_page = last_page.max(1);
    let current_page = current_page.clamp(1, last_page);

    if last_page <= FULL_WINDOW_LIMIT {
        return (1..=last_page).map(Some).collect();
    }

    let start = current_page.saturating_sub(window_size).max(2);
    let end = (current_page + window_size).min(last_page - 1);

    let mut pages = vec![Some(1)];

    if start > 2 {
        pages.push(None);
    }
    pages.extend((start..=end).map(Some));

    if end < last_page - 1 {
        pages.push(None);
    }
    pages.push(Some(last_page));

    pages
}

/// Page position within a known result set, with navigation clamped to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageNav {
    pub page: usize,
    pub last_page: usize,
}

impl PageNav {
    #[must_use]
    pub fn new(page: usize, last_page: usize) -> Self {
        let last_page = last_page.max(1);
        Self {
            page: page.clamp(1, last_page),
            last_page,
        }
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.page < self.last_page
    }

    /// Previous page, or the first page when already there.
    pub fn prev(&self) -> usize {
        self.jump(self.page.saturating_sub(1))
    }

    /// Next page, or the last page when already there.
    pub fn next(&self) -> usize {
        self.jump(self.page + 1)
    }

    /// Requested page clamped into `[1, last_page]`.
    pub fn jump(&self, page: usize) -> usize {
        page.clamp(1, self.last_page)
    }

    pub fn window(&self) -> PageWindow {
        build_window(self.page, self.last_page, DEFAULT_WINDOW_SIZE)
    }
}

/// One page of rows as returned by a collection endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub current_page: usize,
    pub last_page: usize,
    pub per_page: usize,
    pub total: usize,
    #[serde(default)]
    pub from: Option<usize>,
    #[serde(default)]
    pub to: Option<usize>,
}

impl<T> PaginatedResult<T> {
    /// Navigation state for this page as reported by the server.
    pub fn nav(&self) -> PageNav {
        PageNav::new(self.current_page, self.last_page)
    }

    /// Converts every row, keeping the page metadata.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<PaginatedResult<U>, E> {
        let data = self.data.into_iter().map(f).collect::<Result<Vec<U>, E>>()?;
        Ok(PaginatedResult {
            data,
            current_page: self.current_page,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
            from: self.from,
            to: self.to,
        })
    }
}

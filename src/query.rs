//! Filter, search and pagination state of one list view.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::watch;

use crate::debounce::Debouncer;
use crate::domain::resource::Resource;

pub const SEARCH_PARAM: &str = "q";
pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "per_page";

/// Scalar value of a resource-specific filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Date(NaiveDate),
}

impl FilterValue {
    /// Query-string form of the value. Blank text yields `None`.
    pub fn to_param(&self) -> Option<String> {
        match self {
            FilterValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            FilterValue::Bool(value) => Some(value.to_string()),
            FilterValue::Int(value) => Some(value.to_string()),
            FilterValue::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value)
    }
}

/// Raw list state as edited by the user.
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub free_text: String,
    pub filters: BTreeMap<String, FilterValue>,
    pub page_size: usize,
    pub page: usize,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            free_text: String::new(),
            filters: BTreeMap::new(),
            page_size: page_size.max(1),
            page: 1,
        }
    }
}

/// Parameters sent to a collection endpoint. Doubles as the cache key, so
/// field order never matters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EffectiveParams(BTreeMap<String, String>);

impl EffectiveParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn search(&self) -> Option<&str> {
        self.get(SEARCH_PARAM)
    }

    pub fn page(&self) -> Option<usize> {
        self.get(PAGE_PARAM).and_then(|page| page.parse().ok())
    }

    pub fn per_page(&self) -> Option<usize> {
        self.get(PER_PAGE_PARAM).and_then(|per_page| per_page.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// URL-encoded `name=value` pairs in key order.
    pub fn to_query_string(&self) -> String {
        serde_html_form::to_string(&self.0).unwrap_or_else(|err| {
            log::warn!("Failed to encode list parameters: {err}");
            String::new()
        })
    }
}

/// Owns the [`ListQuery`] of one view and derives [`EffectiveParams`] from it.
///
/// Free text goes through a [`Debouncer`]; only the settled text reaches the
/// parameters. Every change to what is being looked for moves the view back
/// to page 1 in the same call.
pub struct QueryController {
    resource: &'static Resource,
    query: ListQuery,
    search: Debouncer<String>,
}

impl QueryController {
    pub fn new(resource: &'static Resource, debounce: Duration) -> Self {
        Self {
            resource,
            query: ListQuery::new(resource.default_page_size),
            search: Debouncer::new(String::new(), debounce),
        }
    }

    pub fn resource(&self) -> &'static Resource {
        self.resource
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Records a keystroke. Must be called from within a Tokio runtime.
    pub fn set_free_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.search.observe(text.clone());
        self.query.free_text = text;
        self.query.page = 1;
    }

    /// Sets a filter declared by the resource. Unknown names are ignored and
    /// `false` is returned.
    pub fn set_filter(&mut self, name: &str, value: impl Into<FilterValue>) -> bool {
        if !self.resource.accepts_filter(name) {
            log::warn!(
                "Ignoring unknown filter `{name}` for resource `{}`",
                self.resource.name
            );
            return false;
        }

        self.query.filters.insert(name.to_string(), value.into());
        self.query.page = 1;
        true
    }

    /// Removes a filter. Returns whether it was set.
    pub fn clear_filter(&mut self, name: &str) -> bool {
        let removed = self.query.filters.remove(name).is_some();
        if removed {
            self.query.page = 1;
        }
        removed
    }

    /// Rows per page. Zero is treated as one.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.query.page_size = page_size.max(1);
        self.query.page = 1;
    }

    /// Jumps to `page` without an upper bound check; the server owns the
    /// last page. Zero is treated as one.
    pub fn set_page(&mut self, page: usize) {
        self.query.page = page.max(1);
    }

    /// Back to the resource defaults. The cleared search applies immediately.
    pub fn reset(&mut self) {
        self.search.settle_now(String::new());
        self.query = ListQuery::new(self.resource.default_page_size);
    }

    /// Search text that has stayed unchanged for the debounce delay.
    pub fn settled_text(&self) -> String {
        self.search.settled()
    }

    /// Whether a keystroke is still waiting to settle.
    pub fn is_settling(&self) -> bool {
        self.search.is_pending()
    }

    /// Receiver woken whenever the settled search text changes.
    pub fn subscribe_search(&self) -> watch::Receiver<String> {
        self.search.subscribe()
    }

    pub fn effective_params(&self) -> EffectiveParams {
        let mut params = BTreeMap::new();

        for (name, value) in &self.query.filters {
            if let Some(value) = value.to_param() {
                params.insert(name.clone(), value);
            }
        }

        let settled = self.search.settled();
        let search = settled.trim();
        if !search.is_empty() {
            params.insert(SEARCH_PARAM.to_string(), search.to_string());
        }

        params.insert(PER_PAGE_PARAM.to_string(), self.query.page_size.to_string());
        params.insert(PAGE_PARAM.to_string(), self.query.page.to_string());

        EffectiveParams(params)
    }

    /// Settled state as a shareable query string, leaving out defaults.
    pub fn location_query(&self) -> String {
        let mut params = self.effective_params();

        if self.query.page_size == self.resource.default_page_size {
            params.0.remove(PER_PAGE_PARAM);
        }
        if self.query.page == 1 {
            params.0.remove(PAGE_PARAM);
        }

        params.to_query_string()
    }

    /// Drops the pending search commit. Called when the view goes away.
    pub fn dispose(&mut self) {
        self.search.cancel();
    }
}

//! Remote list view models for the TPKA admin dashboard: paginated,
//! filterable, debounced tables over the admin REST API.

pub mod cache;
pub mod debounce;
pub mod domain;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod services;
pub mod view_model;

pub use cache::QueryCache;
pub use view_model::{ListSettings, ListSnapshot, ListStatus, ListViewModel};

//! Descriptors of the collections listed by the dashboard.

use serde::de::DeserializeOwned;

/// One remote collection: where it lives and how it may be filtered.
#[derive(Debug, PartialEq, Eq)]
pub struct Resource {
    /// Cache namespace shared by every list of this collection.
    pub name: &'static str,
    pub endpoint: &'static str,
    pub default_page_size: usize,
    /// Filter parameters the endpoint understands besides `q`, `page` and `per_page`.
    pub filters: &'static [&'static str],
}

impl Resource {
    pub fn accepts_filter(&self, name: &str) -> bool {
        self.filters.contains(&name)
    }

    /// Endpoint of a single item in this collection.
    pub fn item_endpoint(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{id}", self.endpoint)
    }
}

/// Row type listed from a [`Resource`].
pub trait ListResource: DeserializeOwned + Send + Sync + 'static {
    const RESOURCE: &'static Resource;
}

pub const OPERATORS: Resource = Resource {
    name: "operators",
    endpoint: "/api/admin/operators",
    default_page_size: 20,
    filters: &[],
};

pub const PARTICIPANTS: Resource = Resource {
    name: "participants",
    endpoint: "/api/admin/participants",
    default_page_size: 20,
    filters: &[],
};

pub const PARTNERS: Resource = Resource {
    name: "partners",
    endpoint: "/api/partners",
    default_page_size: 20,
    filters: &["is_active"],
};

pub const QUESTION_PACKAGES: Resource = Resource {
    name: "question-packages",
    endpoint: "/api/question-packages",
    default_page_size: 20,
    filters: &["is_active"],
};

pub const SCHEDULES: Resource = Resource {
    name: "schedules",
    endpoint: "/api/schedules",
    default_page_size: 10,
    filters: &["status", "date_from", "date_to"],
};

/// Looks a resource up by its namespace.
pub fn by_name(name: &str) -> Option<&'static Resource> {
    [
        &OPERATORS,
        &PARTICIPANTS,
        &PARTNERS,
        &QUESTION_PACKAGES,
        &SCHEDULES,
    ]
    .into_iter()
    .find(|resource| resource.name == name)
}

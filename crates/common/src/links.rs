//! Named routes.
//!
//! The core never builds URLs. It names a route and its parameters, and
//! whoever renders the page turns that into an href with a [`LinkBuilder`].

use std::fmt;

use crate::signoff::CollectionRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    /// The record list of a collection.
    CollectionRecords,
    /// The change history of a collection.
    CollectionHistory,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::CollectionRecords => "collection:records",
            RouteName::CollectionHistory => "collection:history",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLink {
    pub name: RouteName,
    pub params: CollectionRef,
    pub query: Vec<(String, String)>,
}

impl RouteLink {
    pub fn records(collection: &CollectionRef) -> Self {
        Self {
            name: RouteName::CollectionRecords,
            params: collection.clone(),
            query: Vec::new(),
        }
    }

    pub fn history(collection: &CollectionRef) -> Self {
        Self {
            name: RouteName::CollectionHistory,
            params: collection.clone(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Turns a [`RouteLink`] into an href.
pub trait LinkBuilder {
    fn href(&self, link: &RouteLink) -> String;
}

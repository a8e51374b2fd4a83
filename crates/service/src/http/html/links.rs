use common::links::{LinkBuilder, RouteLink, RouteName};
use common::signoff::CollectionRef;

/// Builds hrefs for the console's own HTML routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinks;

impl LinkBuilder for HtmlLinks {
    fn href(&self, link: &RouteLink) -> String {
        let path = match link.name {
            RouteName::CollectionRecords => collection_path(&link.params),
            RouteName::CollectionHistory => format!("{}/history", collection_path(&link.params)),
        };
        if link.query.is_empty() {
            return path;
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&link.query)
            .finish();
        format!("{}?{}", path, query)
    }
}

pub fn collection_path(page: &CollectionRef) -> String {
    format!("/buckets/{}/collections/{}", page.bid, page.cid)
}

/// Where the signoff forms of `page` post to.
pub fn signoff_path(page: &CollectionRef, action: &str) -> String {
    format!("{}/signoff/{}", collection_path(page), action)
}

use crate::entities::{Comment, Post, User};

/// Entities that can be matched by a search box.
pub trait Searchable {
    /// Text fields a query is matched against.
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Post {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.body.as_str()]
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.address.city.as_str()]
    }
}

impl Searchable for Comment {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.body.as_str()]
    }
}

/// Returns the items with a search field containing `query`, ignoring case.
///
/// The query is plain text: no character has a special meaning. An empty
/// query keeps every item. The input is never modified.
pub fn filter<T: Searchable + Clone>(items: &[T], query: &str) -> Vec<T> {
    if query.is_empty() {
        return items.to_vec();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .into_iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

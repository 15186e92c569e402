//! Filter engine - derives the visible subset of a post list.

use std::collections::BTreeMap;

use crate::domain::{Post, PostDetails};

/// Free-text field filters: field name mapped to a query substring.
///
/// A post passes when every entry with a non-empty query matches; empty
/// queries and fields not present in the mapping impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, query: impl Into<String>) {
        self.0.insert(field.into(), query.into());
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn matches<D: PostDetails>(&self, post: &Post<D>) -> bool {
        self.0.iter().all(|(field, query)| {
            if query.is_empty() {
                return true;
            }
            // A field the post does not have coerces to empty text, which
            // can never contain a non-empty query.
            post.field(field)
                .unwrap_or_default()
                .to_lowercase()
                .contains(&query.to_lowercase())
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Pure, order-preserving filter over a snapshot of the store.
pub fn apply<D: PostDetails>(posts: &[Post<D>], filters: &Filters) -> Vec<Post<D>> {
    posts
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BeerDetails, BeerPost};
    use chrono::Utc;

    fn beer(id: i64, name: &str, nation: &str) -> BeerPost {
        Post {
            id,
            name: name.to_string(),
            image_url: String::new(),
            description: None,
            created_at: Utc::now(),
            user_id: None,
            ratings: Vec::new(),
            comments: Vec::new(),
            details: BeerDetails {
                brewery: "Acme".to_string(),
                nation: nation.to_string(),
                style: "Ale".to_string(),
                abv: 5.2,
                price: 4.0,
            },
        }
    }

    #[test]
    fn test_empty_filters_are_identity() {
        let posts = vec![beer(1, "IPA Session", "UK"), beer(2, "Stout", "IE")];
        let out = apply(&posts, &Filters::new());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, 1);
        assert_eq!(out[1].id, 2);
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let posts = vec![beer(1, "IPA Session", "UK"), beer(2, "Stout", "IE")];
        let filters: Filters = [("name", "ip")].into_iter().collect();

        let out = apply(&posts, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "IPA Session");
    }

    #[test]
    fn test_all_entries_must_match() {
        let posts = vec![beer(1, "IPA Session", "UK"), beer(2, "IPA Doppia", "IT")];
        let filters: Filters = [("name", "ipa"), ("nation", "it")].into_iter().collect();

        let out = apply(&posts, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 2);
    }

    #[test]
    fn test_empty_query_imposes_no_constraint() {
        let posts = vec![beer(1, "Stout", "IE")];
        let filters: Filters = [("name", "")].into_iter().collect();
        assert_eq!(apply(&posts, &filters).len(), 1);
    }

    #[test]
    fn test_unknown_field_excludes_everything() {
        let posts = vec![beer(1, "Stout", "IE")];
        let filters: Filters = [("city", "rome")].into_iter().collect();
        assert!(apply(&posts, &filters).is_empty());
    }

    #[test]
    fn test_numeric_fields_match_as_text() {
        let posts = vec![beer(1, "Stout", "IE")];
        let filters: Filters = [("abv", "5.2")].into_iter().collect();
        assert_eq!(apply(&posts, &filters).len(), 1);
    }
}

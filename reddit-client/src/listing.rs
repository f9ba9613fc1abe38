//! Flattening of Reddit's `{kind, data: {children: [{kind, data}]}}` listing
//! envelopes.
//!
//! Every level of the envelope is optional. Children without `data` are
//! dropped, and a missing `data` or `children` yields an empty page. Nothing
//! here fails.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingEnvelope<T> {
    pub kind: Option<String>,
    pub data: Option<ListingData<T>>,
}

impl<T> Default for ListingEnvelope<T> {
    fn default() -> Self {
        Self {
            kind: None,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingData<T> {
    pub children: Option<Vec<ListingChild<T>>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingChild<T> {
    pub kind: Option<String>,
    pub data: Option<T>,
}

/// One normalized page of results plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub after: Option<String>,
}

impl<T> Listing<T> {
    pub fn has_more(&self) -> bool {
        self.after.is_some()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            after: self.after,
        }
    }
}

/// Child payloads in upstream order, skipping children with no `data`.
pub fn extract_children<T>(response: ListingEnvelope<T>) -> Vec<T> {
    response
        .data
        .and_then(|data| data.children)
        .map(|children| children.into_iter().filter_map(|child| child.data).collect())
        .unwrap_or_default()
}

/// [`extract_children`] over raw JSON. Children whose `data` does not fit
/// `T` are dropped too.
pub fn extract_children_from_value<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    let Some(children) = value
        .get("data")
        .and_then(|data| data.get("children"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    children
        .iter()
        .filter_map(|child| child.get("data"))
        .filter(|data| !data.is_null())
        .filter_map(|data| match T::deserialize(data) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("Skipping listing child that failed to parse: {}", e);
                None
            }
        })
        .collect()
}

/// Continuation cursor; an empty string means there is no next page.
pub fn next_cursor<T>(response: &ListingEnvelope<T>) -> Option<&str> {
    response
        .data
        .as_ref()
        .and_then(|data| data.after.as_deref())
        .filter(|after| !after.is_empty())
}

pub fn normalize_listing<T>(response: ListingEnvelope<T>) -> Listing<T> {
    let after = next_cursor(&response).map(str::to_string);
    Listing {
        items: extract_children(response),
        after,
    }
}

/// [`normalize_listing`] over raw JSON, using the per-child tolerance of
/// [`extract_children_from_value`].
pub fn normalize_listing_value<T: DeserializeOwned>(value: &Value) -> Listing<T> {
    let after = value
        .get("data")
        .and_then(|data| data.get("after"))
        .and_then(Value::as_str)
        .filter(|after| !after.is_empty())
        .map(str::to_string);
    Listing {
        items: extract_children_from_value(value),
        after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Item {
        id: String,
    }

    fn envelope(value: Value) -> ListingEnvelope<Item> {
        serde_json::from_value(value).unwrap()
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_extract_preserves_order() {
        let response = envelope(json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t3", "data": {"id": "c"}},
                    {"kind": "t3", "data": {"id": "a"}},
                    {"kind": "t3", "data": {"id": "b"}}
                ],
                "after": "t3_b"
            }
        }));
        assert_eq!(ids(&extract_children(response)), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_extract_drops_children_without_data() {
        let response = envelope(json!({
            "data": {
                "children": [
                    {"kind": "t3", "data": {"id": "a"}},
                    {"kind": "t3"},
                    {"kind": "t3", "data": null},
                    {"data": {"id": "d"}}
                ]
            }
        }));
        let items = extract_children(response);
        assert_eq!(items.len(), 2);
        assert_eq!(ids(&items), vec!["a", "d"]);
    }

    #[test]
    fn test_extract_empty_shapes() {
        assert!(extract_children(envelope(json!({}))).is_empty());
        assert!(extract_children(envelope(json!({"data": {}}))).is_empty());
        assert!(extract_children(envelope(json!({"data": null}))).is_empty());
        assert!(extract_children(envelope(json!({"data": {"children": []}}))).is_empty());
        assert!(extract_children(envelope(json!({"data": {"children": null}}))).is_empty());
        assert!(extract_children(ListingEnvelope::<Item>::default()).is_empty());
    }

    #[test]
    fn test_extract_from_value_tolerates_bad_children() {
        let value = json!({
            "data": {
                "children": [
                    {"data": {"id": "a"}},
                    {"data": {"unexpected": true}},
                    {"data": null},
                    "not an object",
                    {"data": {"id": "e"}}
                ]
            }
        });
        let items: Vec<Item> = extract_children_from_value(&value);
        assert_eq!(ids(&items), vec!["a", "e"]);
    }

    #[test]
    fn test_extract_from_value_non_listing() {
        assert!(extract_children_from_value::<Item>(&json!(null)).is_empty());
        assert!(extract_children_from_value::<Item>(&json!([1, 2, 3])).is_empty());
        assert!(extract_children_from_value::<Item>(&json!({"data": {"children": {}}})).is_empty());
    }

    #[test]
    fn test_normalize_cursor() {
        let listing = normalize_listing(envelope(json!({
            "data": {"children": [{"data": {"id": "a"}}], "after": "t3_a"}
        })));
        assert_eq!(listing.after.as_deref(), Some("t3_a"));
        assert!(listing.has_more());

        let listing = normalize_listing(envelope(json!({
            "data": {"children": [], "after": null}
        })));
        assert_eq!(listing.after, None);

        let listing = normalize_listing(envelope(json!({"data": {"after": ""}})));
        assert_eq!(listing.after, None);
        assert!(!listing.has_more());
    }

    #[test]
    fn test_normalize_value_matches_typed() {
        let value = json!({
            "data": {"children": [{"data": {"id": "x"}}, {"kind": "more"}], "after": "t3_x"}
        });
        let from_value: Listing<Item> = normalize_listing_value(&value);
        let typed = normalize_listing(envelope(value));
        assert_eq!(from_value, typed);
    }

    #[test]
    fn test_listing_map() {
        let listing = Listing {
            items: vec![1, 2, 3],
            after: Some("t3_c".to_string()),
        };
        let doubled = listing.map(|n| n * 2);
        assert_eq!(doubled.items, vec![2, 4, 6]);
        assert_eq!(doubled.after.as_deref(), Some("t3_c"));
    }
}

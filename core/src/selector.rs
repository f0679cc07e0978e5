//! The `selectedFields` query parameter.
//!
//! PI Web API trims a response down to the listed fields. Paths use `.` to
//! reach into nested objects (`Links.Self`) and collection responses are
//! addressed through `Items` (`Items.Name`). Entries are joined with `;`.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::schema::PiObject;

/// Ordered list of wire field paths to keep in a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelector {
    fields: Vec<String>,
}

impl FieldSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = path.trim();
        if !path.is_empty() {
            self.fields.push(path.to_string());
        }
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value sent as `selectedFields`.
    pub fn to_query_value(&self) -> String {
        self.fields.join(";")
    }

    /// Entries whose top-level name is not a wire field of `T`.
    pub fn unknown_fields<T: PiObject>(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|path| !T::has_wire_field(top_level(path)))
            .collect()
    }

    /// Like `unknown_fields`, for a `PIItems<T>` response: entries must go
    /// through `Items.` (checked against `T`) or name the page's `Links`.
    pub fn unknown_item_fields<T: PiObject>(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|path| {
                let head = top_level(path);
                if head.eq_ignore_ascii_case("Links") {
                    return false;
                }
                if !head.eq_ignore_ascii_case("Items") {
                    return true;
                }
                match path.split_once('.') {
                    Some((_, rest)) => !T::has_wire_field(top_level(rest)),
                    None => false,
                }
            })
            .collect()
    }
}

fn top_level(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

impl<S: Into<String>> FromIterator<S> for FieldSelector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FieldSelector::new(), |selector, path| selector.field(path))
    }
}

impl FromStr for FieldSelector {
    type Err = Infallible;

    /// Parses the wire form, `WebId;Name;Links.Self`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(';').collect())
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PIElement;

    #[test]
    fn joins_fields_with_semicolons() {
        let selector = FieldSelector::new().field("WebId").field("Links.Self");
        assert_eq!(selector.to_query_value(), "WebId;Links.Self");
    }

    #[test]
    fn blank_entries_are_dropped() {
        let selector: FieldSelector = "WebId;; Name ;".parse().unwrap();
        assert_eq!(selector.fields(), &["WebId".to_string(), "Name".to_string()]);

        let empty: FieldSelector = "".parse().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn reports_unknown_top_level_fields() {
        let selector: FieldSelector = ["webid", "Links.Self", "Colour"].into_iter().collect();
        assert_eq!(selector.unknown_fields::<PIElement>(), vec!["Colour"]);
    }

    #[test]
    fn item_fields_are_checked_through_items() {
        let selector: FieldSelector = ["Items.Name", "Items.Colour", "Links", "Name"]
            .into_iter()
            .collect();
        assert_eq!(
            selector.unknown_item_fields::<PIElement>(),
            vec!["Items.Colour", "Name"]
        );
    }
}

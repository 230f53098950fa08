//! Typed document content
//!
//! A document is a list of content groups; a group is a list of labeled
//! values whose `content_group_label` item names the group. Values are a
//! closed set of kinds ([`FlexValue`]) so every reader can match on them.

use std::fmt;

use serde::{Deserialize, Serialize};

use dho_common::names::{groups, labels};
use dho_common::{Asset, Checksum256, Name, TimePoint};

use crate::error::{GraphError, GraphResult};

/// A single content value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FlexValue {
    String(String),
    Int64(i64),
    Asset(Asset),
    Name(Name),
    Checksum256(Checksum256),
    TimePoint(TimePoint),
}

impl FlexValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FlexValue::String(_) => "string",
            FlexValue::Int64(_) => "int64",
            FlexValue::Asset(_) => "asset",
            FlexValue::Name(_) => "name",
            FlexValue::Checksum256(_) => "checksum256",
            FlexValue::TimePoint(_) => "time_point",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlexValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FlexValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            FlexValue::Asset(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            FlexValue::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_checksum(&self) -> Option<&Checksum256> {
        match self {
            FlexValue::Checksum256(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_time_point(&self) -> Option<&TimePoint> {
        match self {
            FlexValue::TimePoint(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for FlexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexValue::String(s) => f.write_str(s),
            FlexValue::Int64(v) => write!(f, "{}", v),
            FlexValue::Asset(a) => write!(f, "{}", a),
            FlexValue::Name(n) => write!(f, "{}", n),
            FlexValue::Checksum256(c) => write!(f, "{}", c),
            FlexValue::TimePoint(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<String> for FlexValue {
    fn from(value: String) -> Self {
        FlexValue::String(value)
    }
}

impl From<&str> for FlexValue {
    fn from(value: &str) -> Self {
        FlexValue::String(value.to_string())
    }
}

impl From<i64> for FlexValue {
    fn from(value: i64) -> Self {
        FlexValue::Int64(value)
    }
}

impl From<Asset> for FlexValue {
    fn from(value: Asset) -> Self {
        FlexValue::Asset(value)
    }
}

impl From<Name> for FlexValue {
    fn from(value: Name) -> Self {
        FlexValue::Name(value)
    }
}

impl From<Checksum256> for FlexValue {
    fn from(value: Checksum256) -> Self {
        FlexValue::Checksum256(value)
    }
}

impl From<TimePoint> for FlexValue {
    fn from(value: TimePoint) -> Self {
        FlexValue::TimePoint(value)
    }
}

/// A labeled value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub label: String,
    pub value: FlexValue,
}

impl Content {
    pub fn new(label: impl Into<String>, value: impl Into<FlexValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

pub type ContentGroup = Vec<Content>;

/// Build a group whose first item is its `content_group_label`
pub fn content_group(label: &str, items: impl IntoIterator<Item = Content>) -> ContentGroup {
    let mut group = vec![Content::new(groups::CONTENT_GROUP_LABEL, label)];
    group.extend(items);
    group
}

/// `system` group carrying the document type and a display label
pub fn system_group(doc_type: &str, node_label: impl Into<String>) -> GraphResult<ContentGroup> {
    Ok(content_group(
        groups::SYSTEM,
        [
            Content::new(labels::TYPE, Name::new(doc_type)?),
            Content::new(labels::NODE_LABEL, node_label.into()),
        ],
    ))
}

/// Label of a group, if it carries one
pub fn group_label(group: &ContentGroup) -> Option<&str> {
    group
        .iter()
        .find(|c| c.label == groups::CONTENT_GROUP_LABEL)
        .and_then(|c| c.value.as_str())
}

/// The content groups of a document with label-based access
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentWrapper(Vec<ContentGroup>);

impl ContentWrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_groups(groups: Vec<ContentGroup>) -> Self {
        Self(groups)
    }

    pub fn groups(&self) -> &[ContentGroup] {
        &self.0
    }

    pub fn into_groups(self) -> Vec<ContentGroup> {
        self.0
    }

    pub fn push_group(&mut self, group: ContentGroup) {
        self.0.push(group);
    }

    /// Builder form of [`push_group`](Self::push_group)
    pub fn with_group(mut self, label: &str, items: impl IntoIterator<Item = Content>) -> Self {
        self.0.push(content_group(label, items));
        self
    }

    fn group_index(&self, label: &str) -> Option<usize> {
        self.0.iter().position(|g| group_label(g) == Some(label))
    }

    pub fn has_group(&self, label: &str) -> bool {
        self.group_index(label).is_some()
    }

    pub fn get_group(&self, label: &str) -> Option<&ContentGroup> {
        self.group_index(label).map(|idx| &self.0[idx])
    }

    pub fn get_group_or_fail(&self, label: &str) -> GraphResult<&ContentGroup> {
        self.get_group(label)
            .ok_or_else(|| GraphError::GroupNotFound(label.to_string()))
    }

    pub fn get_group_mut(&mut self, label: &str) -> Option<&mut ContentGroup> {
        let idx = self.group_index(label)?;
        Some(&mut self.0[idx])
    }

    pub fn get(&self, group: &str, label: &str) -> Option<&FlexValue> {
        self.get_group(group)?
            .iter()
            .find(|c| c.label == label)
            .map(|c| &c.value)
    }

    pub fn get_or_fail(&self, group: &str, label: &str) -> GraphResult<&FlexValue> {
        self.get(group, label).ok_or_else(|| GraphError::ContentNotFound {
            group: group.to_string(),
            label: label.to_string(),
        })
    }

    fn typed<'a, T>(
        &'a self,
        group: &str,
        label: &str,
        expected: &'static str,
        pick: impl FnOnce(&'a FlexValue) -> Option<T>,
    ) -> GraphResult<T> {
        pick(self.get_or_fail(group, label)?).ok_or_else(|| GraphError::ContentTypeMismatch {
            label: label.to_string(),
            expected,
        })
    }

    pub fn get_str(&self, group: &str, label: &str) -> GraphResult<&str> {
        self.typed(group, label, "string", FlexValue::as_str)
    }

    pub fn get_i64(&self, group: &str, label: &str) -> GraphResult<i64> {
        self.typed(group, label, "int64", FlexValue::as_i64)
    }

    pub fn get_asset(&self, group: &str, label: &str) -> GraphResult<&Asset> {
        self.typed(group, label, "asset", FlexValue::as_asset)
    }

    pub fn get_name(&self, group: &str, label: &str) -> GraphResult<&Name> {
        self.typed(group, label, "name", FlexValue::as_name)
    }

    pub fn get_checksum(&self, group: &str, label: &str) -> GraphResult<&Checksum256> {
        self.typed(group, label, "checksum256", FlexValue::as_checksum)
    }

    pub fn get_time_point(&self, group: &str, label: &str) -> GraphResult<&TimePoint> {
        self.typed(group, label, "time_point", FlexValue::as_time_point)
    }

    /// Optional int64 item; present items of another kind are an error
    pub fn opt_i64(&self, group: &str, label: &str) -> GraphResult<Option<i64>> {
        match self.get(group, label) {
            None => Ok(None),
            Some(_) => self.get_i64(group, label).map(Some),
        }
    }

    /// Optional asset item; present items of another kind are an error
    pub fn opt_asset(&self, group: &str, label: &str) -> GraphResult<Option<&Asset>> {
        match self.get(group, label) {
            None => Ok(None),
            Some(_) => self.get_asset(group, label).map(Some),
        }
    }

    /// Set `label` in `group`, creating the group when it is missing
    pub fn insert_or_replace(&mut self, group: &str, content: Content) {
        match self.get_group_mut(group) {
            Some(items) => match items.iter_mut().find(|c| c.label == content.label) {
                Some(existing) => existing.value = content.value,
                None => items.push(content),
            },
            None => self.0.push(content_group(group, [content])),
        }
    }

    pub fn remove(&mut self, group: &str, label: &str) -> Option<Content> {
        let items = self.get_group_mut(group)?;
        let idx = items.iter().position(|c| c.label == label)?;
        Some(items.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dho_common::Symbol;

    fn sample() -> ContentWrapper {
        ContentWrapper::new()
            .with_group(
                "details",
                [
                    Content::new("title", "Hardware policy"),
                    Content::new("period_count", 13_i64),
                    Content::new("amount", Asset::new(5000, Symbol::usd())),
                ],
            )
            .with_group("system", [Content::new("type", Name::new("attestation").unwrap())])
    }

    #[test]
    fn test_lookup_by_group_and_label() {
        let content = sample();
        assert_eq!(content.get_str("details", "title").unwrap(), "Hardware policy");
        assert_eq!(content.get_i64("details", "period_count").unwrap(), 13);
        assert_eq!(content.get_asset("details", "amount").unwrap().to_string(), "50.00 USD");
        assert_eq!(content.get_name("system", "type").unwrap().as_str(), "attestation");
        assert!(content.has_group("system"));
        assert!(!content.has_group("ballot"));
    }

    #[test]
    fn test_missing_and_mismatched_content() {
        let content = sample();

        let err = content.get_or_fail("details", "description").unwrap_err();
        assert!(err.to_string().contains("content label not found"));

        let err = content.get_i64("details", "title").unwrap_err();
        assert!(matches!(err, GraphError::ContentTypeMismatch { expected: "int64", .. }));

        assert!(matches!(
            content.get_group_or_fail("ballot"),
            Err(GraphError::GroupNotFound(_))
        ));
        assert_eq!(content.opt_i64("details", "missing").unwrap(), None);
        assert!(content.opt_i64("details", "title").is_err());
    }

    #[test]
    fn test_insert_or_replace_and_remove() {
        let mut content = sample();

        content.insert_or_replace("details", Content::new("period_count", 26_i64));
        assert_eq!(content.get_i64("details", "period_count").unwrap(), 26);
        assert_eq!(content.get_group("details").unwrap().len(), 4);

        content.insert_or_replace("ballot", Content::new("notes", "new group"));
        assert_eq!(content.get_str("ballot", "notes").unwrap(), "new group");

        let removed = content.remove("details", "title").unwrap();
        assert_eq!(removed.value, FlexValue::from("Hardware policy"));
        assert!(content.get("details", "title").is_none());
    }

    #[test]
    fn test_flex_value_json_shape() {
        let json = serde_json::to_value(FlexValue::from(7_i64)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "int64", "value": 7}));
    }
}

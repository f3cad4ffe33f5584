use ahash::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A datasource visible in a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInfo {
  #[serde(default)]
  pub uid: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type", default)]
  pub ds_type: String,
  #[serde(default)]
  pub api_version: String,
  #[serde(default)]
  pub is_default: bool,
}

impl DataSourceInfo {
  pub fn new(uid: impl Into<String>, name: impl Into<String>, ds_type: impl Into<String>) -> Self {
    Self {
      uid: uid.into(),
      name: name.into(),
      ds_type: ds_type.into(),
      ..Self::default()
    }
  }

  pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
    self.api_version = api_version.into();
    self
  }

  /// Flags this record as the namespace default.
  pub fn with_default(mut self, is_default: bool) -> Self {
    self.is_default = is_default;
    self
  }
}

/// O(1) name and UID resolution over a list of datasources.
///
/// Built in a single pass. A later record with the same name or UID replaces
/// the earlier mapping, and the last record flagged `is_default` becomes the
/// default. Records with an empty name (or UID) are not reachable by name
/// (or UID). The index is immutable once built.
#[derive(Clone, Default)]
pub struct DataSourceIndex {
  by_name: HashMap<String, Arc<DataSourceInfo>>,
  by_uid: HashMap<String, Arc<DataSourceInfo>>,
  default: Option<Arc<DataSourceInfo>>,
}

impl fmt::Debug for DataSourceIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DataSourceIndex")
      .field("names", &self.by_name.len())
      .field("uids", &self.by_uid.len())
      .field("default", &self.default.as_ref().map(|ds| ds.uid.as_str()))
      .finish()
  }
}

impl DataSourceIndex {
  pub fn build<I>(records: I) -> Self
  where
    I: IntoIterator<Item = DataSourceInfo>,
  {
    let records = records.into_iter();
    let (lower, _) = records.size_hint();
    let mut index = Self {
      by_name: HashMap::with_capacity_and_hasher(lower, Default::default()),
      by_uid: HashMap::with_capacity_and_hasher(lower, Default::default()),
      default: None,
    };

    for record in records {
      let record = Arc::new(record);
      if !record.name.is_empty() {
        index.by_name.insert(record.name.clone(), Arc::clone(&record));
      }
      if !record.uid.is_empty() {
        index.by_uid.insert(record.uid.clone(), Arc::clone(&record));
      }
      if record.is_default {
        index.default = Some(record);
      }
    }
    index
  }

  /// Resolves a name first, then a UID.
  pub fn lookup(&self, name_or_uid: &str) -> Option<&DataSourceInfo> {
    self
      .lookup_by_name(name_or_uid)
      .or_else(|| self.lookup_by_uid(name_or_uid))
  }

  pub fn lookup_by_name(&self, name: &str) -> Option<&DataSourceInfo> {
    self.by_name.get(name).map(Arc::as_ref)
  }

  pub fn lookup_by_uid(&self, uid: &str) -> Option<&DataSourceInfo> {
    self.by_uid.get(uid).map(Arc::as_ref)
  }

  /// The namespace default, if any record was flagged as one.
  pub fn default_datasource(&self) -> Option<&DataSourceInfo> {
    self.default.as_deref()
  }

  /// Number of records reachable by UID.
  pub fn len(&self) -> usize {
    self.by_uid.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_name.is_empty() && self.by_uid.is_empty() && self.default.is_none()
  }
}

impl FromIterator<DataSourceInfo> for DataSourceIndex {
  fn from_iter<I: IntoIterator<Item = DataSourceInfo>>(iter: I) -> Self {
    Self::build(iter)
  }
}

/// Picks the default datasource from a plain list: the last flagged record,
/// the same one [`DataSourceIndex::build`] selects.
pub fn select_default(records: &[DataSourceInfo]) -> Option<&DataSourceInfo> {
  records.iter().rev().find(|ds| ds.is_default)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn resolves_names_before_uids() {
    // "shared" is one record's name and another's UID.
    let index = DataSourceIndex::build(vec![
      DataSourceInfo::new("shared", "Loki", "loki"),
      DataSourceInfo::new("p1", "shared", "prometheus"),
    ]);

    assert_eq!(index.lookup("shared").map(|ds| ds.uid.as_str()), Some("p1"));
    assert_eq!(index.lookup_by_uid("shared").map(|ds| ds.name.as_str()), Some("Loki"));
    assert_eq!(index.lookup("Loki").map(|ds| ds.ds_type.as_str()), Some("loki"));
    assert_eq!(index.lookup("nope"), None);
  }

  #[test]
  fn empty_keys_are_not_indexed() {
    let index = DataSourceIndex::build(vec![
      DataSourceInfo::new("", "NoUid", "a"),
      DataSourceInfo::new("no-name", "", "b"),
    ]);

    assert_eq!(index.lookup_by_name(""), None);
    assert_eq!(index.lookup_by_uid(""), None);
    assert_eq!(index.lookup(""), None);
    assert!(index.lookup_by_name("NoUid").is_some());
    assert!(index.lookup_by_uid("no-name").is_some());
    assert_eq!(index.len(), 1);
  }

  #[test]
  fn last_default_wins() {
    let records = vec![
      DataSourceInfo::new("a", "A", "x").with_default(true),
      DataSourceInfo::new("b", "B", "y"),
      DataSourceInfo::new("c", "C", "z").with_default(true),
    ];
    let index = DataSourceIndex::build(records.clone());

    assert_eq!(index.default_datasource().map(|ds| ds.uid.as_str()), Some("c"));
    assert_eq!(select_default(&records), index.default_datasource());
  }

  #[test]
  fn empty_index() {
    let index: DataSourceIndex = std::iter::empty::<DataSourceInfo>().collect();
    assert!(index.is_empty());
    assert_eq!(index.default_datasource(), None);
    assert_eq!(select_default(&[]), None);
  }

  #[test]
  fn serde_field_names() {
    let ds = DataSourceInfo::new("p1", "Prometheus", "prometheus")
      .with_api_version("v1")
      .with_default(true);
    let json = serde_json::to_value(&ds).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "uid": "p1",
        "name": "Prometheus",
        "type": "prometheus",
        "apiVersion": "v1",
        "isDefault": true,
      })
    );

    let parsed: DataSourceInfo = serde_json::from_str(r#"{"uid":"l1","type":"loki"}"#).unwrap();
    assert_eq!(parsed, DataSourceInfo::new("l1", "", "loki"));
  }
}

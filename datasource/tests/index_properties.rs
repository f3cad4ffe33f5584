use proptest::prelude::*;
use scopecache_datasource::{select_default, DataSourceIndex, DataSourceInfo};

fn ds(uid: &str, name: &str) -> DataSourceInfo {
  DataSourceInfo::new(uid, name, "test")
}

#[test]
fn test_lookup_examples() {
  let index = DataSourceIndex::build(vec![ds("a", "X"), ds("b", "Y").with_default(true)]);

  assert_eq!(index.lookup("X").map(|r| r.uid.as_str()), Some("a"));
  assert_eq!(index.lookup("b").map(|r| r.name.as_str()), Some("Y"));
  assert_eq!(index.lookup("missing"), None);
  assert_eq!(index.default_datasource().map(|r| r.uid.as_str()), Some("b"));
}

#[test]
fn test_duplicate_uid_last_write_wins() {
  let index = DataSourceIndex::build(vec![ds("a", "X"), ds("a", "Z")]);

  assert_eq!(index.lookup_by_uid("a").map(|r| r.name.as_str()), Some("Z"));
  // The earlier record is still reachable by its own name.
  assert_eq!(index.lookup_by_name("X").map(|r| r.uid.as_str()), Some("a"));
}

#[test]
fn test_no_default_flagged() {
  let index = DataSourceIndex::build(vec![ds("a", "X"), ds("b", "Y")]);
  assert_eq!(index.default_datasource(), None);
}

/// Small alphabets so that duplicate and empty keys are common.
fn record_strategy() -> impl Strategy<Value = DataSourceInfo> {
  ("[abc]?", "[XYZ]?", "[pl]", any::<bool>()).prop_map(|(uid, name, ds_type, is_default)| {
    DataSourceInfo::new(uid, name, ds_type).with_default(is_default)
  })
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(500))]

  /// Every non-empty key maps to the last record carrying it.
  #[test]
  fn prop_last_write_wins(records in prop::collection::vec(record_strategy(), 0..16)) {
    let index = DataSourceIndex::build(records.clone());

    for record in &records {
      if !record.uid.is_empty() {
        let expected = records.iter().rev().find(|r| r.uid == record.uid);
        prop_assert_eq!(index.lookup_by_uid(&record.uid), expected);
      }
      if !record.name.is_empty() {
        let expected = records.iter().rev().find(|r| r.name == record.name);
        prop_assert_eq!(index.lookup_by_name(&record.name), expected);
      }
    }
  }

  /// Empty names and UIDs are never keys.
  #[test]
  fn prop_empty_keys_absent(records in prop::collection::vec(record_strategy(), 0..16)) {
    let index = DataSourceIndex::build(records);
    prop_assert!(index.lookup_by_uid("").is_none());
    prop_assert!(index.lookup_by_name("").is_none());
  }

  /// Name resolution takes precedence over UID resolution.
  #[test]
  fn prop_lookup_prefers_names(
    records in prop::collection::vec(record_strategy(), 0..16),
    key in "[abcXYZ]",
  ) {
    let index = DataSourceIndex::build(records);
    let expected = index.lookup_by_name(&key).or_else(|| index.lookup_by_uid(&key));
    prop_assert_eq!(index.lookup(&key), expected);
  }

  /// The index and the standalone helper agree on the default record.
  #[test]
  fn prop_default_selection_agrees(records in prop::collection::vec(record_strategy(), 0..16)) {
    let index = DataSourceIndex::build(records.clone());
    let expected = records.iter().rev().find(|r| r.is_default);

    prop_assert_eq!(index.default_datasource(), expected);
    prop_assert_eq!(select_default(&records), expected);
  }
}

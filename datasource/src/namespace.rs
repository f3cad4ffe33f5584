use crate::error::NamespaceError;

use std::fmt;
use std::str::FromStr;

const DEFAULT_NAMESPACE: &str = "default";
const ORG_PREFIX: &str = "org-";
const STACK_PREFIX: &str = "stacks-";

/// The tenant a namespace string refers to.
///
/// | namespace    | org | stack |
/// |--------------|-----|-------|
/// | `default`    | 1   | -     |
/// | `org-<n>`    | n   | -     |
/// | `stacks-<n>` | 1   | n     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceInfo {
  pub org_id: i64,
  pub stack_id: Option<i64>,
}

impl NamespaceInfo {
  pub fn parse(namespace: &str) -> Result<Self, NamespaceError> {
    if namespace == DEFAULT_NAMESPACE {
      return Ok(Self {
        org_id: 1,
        stack_id: None,
      });
    }

    if let Some(raw) = namespace.strip_prefix(ORG_PREFIX) {
      let org_id = parse_id(namespace, raw)?;
      return Ok(Self {
        org_id,
        stack_id: None,
      });
    }

    if let Some(raw) = namespace.strip_prefix(STACK_PREFIX) {
      let stack_id = parse_id(namespace, raw)?;
      return Ok(Self {
        org_id: 1,
        stack_id: Some(stack_id),
      });
    }

    Err(NamespaceError::Unrecognized(namespace.to_string()))
  }
}

fn parse_id(namespace: &str, raw: &str) -> Result<i64, NamespaceError> {
  match raw.parse::<i64>() {
    Ok(id) if id >= 1 => Ok(id),
    _ => Err(NamespaceError::InvalidId {
      namespace: namespace.to_string(),
      id: raw.to_string(),
    }),
  }
}

impl FromStr for NamespaceInfo {
  type Err = NamespaceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

/// Renders the canonical namespace. Org 1 without a stack is `default`.
impl fmt::Display for NamespaceInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (self.org_id, self.stack_id) {
      (_, Some(stack)) => write!(f, "{STACK_PREFIX}{stack}"),
      (1, None) => f.write_str(DEFAULT_NAMESPACE),
      (org, None) => write!(f, "{ORG_PREFIX}{org}"),
    }
  }
}

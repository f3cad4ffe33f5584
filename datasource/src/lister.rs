use crate::context::RequestContext;
use crate::error::ProviderError;
use crate::index::DataSourceInfo;

use ahash::HashMap;
use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lists the datasources visible in the context's namespace.
///
/// This is the expensive call the index cache exists to avoid repeating.
/// Implementations should honor the context's deadline if they block.
pub trait DataSourceLister: Send + Sync {
  fn list(&self, ctx: &RequestContext) -> Result<Vec<DataSourceInfo>, ProviderError>;
}

impl<L: DataSourceLister + ?Sized> DataSourceLister for Arc<L> {
  fn list(&self, ctx: &RequestContext) -> Result<Vec<DataSourceInfo>, ProviderError> {
    (**self).list(ctx)
  }
}

/// An in-memory lister whose contents can be replaced at runtime.
///
/// Unknown namespaces list as empty.
#[derive(Debug, Default)]
pub struct StaticLister {
  namespaces: RwLock<HashMap<String, Vec<DataSourceInfo>>>,
}

impl StaticLister {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(self, namespace: impl Into<String>, records: Vec<DataSourceInfo>) -> Self {
    self.set(namespace, records);
    self
  }

  /// Replaces the records of `namespace`. Cached indexes are not affected
  /// until they expire or are invalidated.
  pub fn set(&self, namespace: impl Into<String>, records: Vec<DataSourceInfo>) {
    self.namespaces.write().insert(namespace.into(), records);
  }
}

impl DataSourceLister for StaticLister {
  fn list(&self, ctx: &RequestContext) -> Result<Vec<DataSourceInfo>, ProviderError> {
    let namespace = ctx.namespace().unwrap_or_default();
    Ok(self.namespaces.read().get(namespace).cloned().unwrap_or_default())
  }
}

/// Reads `<root>/<namespace>.json`, a JSON array of datasources.
///
/// A missing file lists as empty. An unscoped context reads `default.json`.
#[derive(Debug, Clone)]
pub struct JsonDirLister {
  root: PathBuf,
}

impl JsonDirLister {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn path_for(&self, namespace: &str) -> Result<PathBuf, ProviderError> {
    // Namespaces are file stems; anything that could leave `root` is refused.
    if namespace.contains(['/', '\\']) || namespace.starts_with('.') {
      return Err(ProviderError::backend(namespace, "namespace is not a valid file name"));
    }
    Ok(self.root.join(format!("{namespace}.json")))
  }
}

impl DataSourceLister for JsonDirLister {
  fn list(&self, ctx: &RequestContext) -> Result<Vec<DataSourceInfo>, ProviderError> {
    let namespace = ctx.namespace().filter(|ns| !ns.is_empty()).unwrap_or("default");
    let path = self.path_for(namespace)?;

    let contents = match fs::read_to_string(&path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == io::ErrorKind::NotFound => {
        tracing::debug!(path = %path.display(), "no datasource file; namespace has no datasources");
        return Ok(Vec::new());
      }
      Err(err) => return Err(err.into()),
    };

    ctx.check_deadline()?;
    Ok(serde_json::from_str(&contents)?)
  }
}

use thiserror::Error;

/// Errors raised while loading a namespace's datasources.
#[derive(Debug, Error)]
pub enum ProviderError {
  /// The request's deadline passed before the index could be built.
  #[error("deadline exceeded while loading datasources for '{namespace}'")]
  DeadlineExceeded { namespace: String },

  /// The datasource backend failed.
  #[error("failed to list datasources for '{namespace}': {message}")]
  Backend { namespace: String, message: String },

  #[error("failed to read datasource list: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to parse datasource list: {0}")]
  Parse(#[from] serde_json::Error),
}

impl ProviderError {
  pub fn backend(namespace: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Backend {
      namespace: namespace.into(),
      message: message.into(),
    }
  }
}

/// A namespace string that does not name a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
  #[error("unrecognized namespace '{0}'")]
  Unrecognized(String),

  #[error("invalid id '{id}' in namespace '{namespace}'")]
  InvalidId { namespace: String, id: String },
}

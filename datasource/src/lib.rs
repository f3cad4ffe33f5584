//! A namespace-scoped datasource lookup index, memoized per namespace with
//! [`scopecache`].
//!
//! ```
//! use scopecache_datasource::{
//!   CachedIndexProvider, DataSourceIndexProvider, DataSourceInfo, RequestContext, StaticLister,
//! };
//!
//! let lister = StaticLister::new().with(
//!   "org-2",
//!   vec![
//!     DataSourceInfo::new("p1", "Prometheus", "prometheus").with_default(true),
//!     DataSourceInfo::new("l1", "Loki", "loki"),
//!   ],
//! );
//! let provider = CachedIndexProvider::new(lister).unwrap();
//!
//! let index = provider.index(&RequestContext::with_namespace("org-2")).unwrap();
//! assert_eq!(index.lookup("Loki").map(|ds| ds.uid.as_str()), Some("l1"));
//! assert_eq!(index.default_datasource().map(|ds| ds.ds_type.as_str()), Some("prometheus"));
//! ```

pub mod context;
pub mod error;
pub mod index;
pub mod lister;
pub mod namespace;
pub mod provider;
pub mod resolve;

pub use context::{NamespaceScope, RequestContext};
pub use error::{NamespaceError, ProviderError};
pub use index::{select_default, DataSourceIndex, DataSourceInfo};
pub use lister::{DataSourceLister, JsonDirLister, StaticLister};
pub use namespace::NamespaceInfo;
pub use provider::{CachedIndexProvider, DataSourceIndexProvider, DirectIndexProvider};
pub use resolve::{datasource_type_by_uid, default_datasource_type, resolve_grafana_datasource_uid};

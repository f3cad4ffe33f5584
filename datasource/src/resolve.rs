//! Datasource type resolution for documents that reference datasources
//! loosely, by UID or not at all.

use crate::context::RequestContext;
use crate::index::DataSourceIndex;
use crate::provider::DataSourceIndexProvider;

use std::sync::Arc;
use tracing::field::Empty;

/// Type reported when nothing better is known.
pub const GRAFANA_DATASOURCE_TYPE: &str = "grafana";
/// UID of the built-in datasource whose type is `"datasource"`.
pub const GRAFANA_DATASOURCE_UID: &str = "grafana";

fn load_index(ctx: &RequestContext, provider: &dyn DataSourceIndexProvider) -> Option<Arc<DataSourceIndex>> {
  match provider.index(ctx) {
    Ok(index) => Some(index),
    Err(err) => {
      tracing::warn!(
        namespace = ctx.namespace().unwrap_or_default(),
        error = %err,
        "could not load datasource index; falling back to the built-in type"
      );
      None
    }
  }
}

/// The type of the namespace's default datasource, or [`GRAFANA_DATASOURCE_TYPE`]
/// when there is no provider, no default, or the index cannot be loaded.
///
/// Runs in a `get_default_datasource` span that records the chosen
/// `datasource.type` and, when falling back, the `reason`.
pub fn default_datasource_type(ctx: &RequestContext, provider: Option<&dyn DataSourceIndexProvider>) -> String {
  let span = tracing::debug_span!(
    "get_default_datasource",
    namespace = ctx.namespace().unwrap_or_default(),
    "datasource.type" = Empty,
    datasource.uid = Empty,
    datasource.name = Empty,
    reason = Empty
  );
  let _entered = span.enter();

  let fallback = |reason: &str| {
    span.record("datasource.type", GRAFANA_DATASOURCE_TYPE);
    span.record("reason", reason);
    GRAFANA_DATASOURCE_TYPE.to_string()
  };

  let Some(provider) = provider else {
    return fallback("provider_nil");
  };
  let Some(index) = load_index(ctx, provider) else {
    return fallback("index_unavailable");
  };
  match index.default_datasource() {
    Some(ds) => {
      span.record("datasource.type", ds.ds_type.as_str());
      span.record("datasource.uid", ds.uid.as_str());
      span.record("datasource.name", ds.name.as_str());
      ds.ds_type.clone()
    }
    None => fallback("no_default_found"),
  }
}

/// The type of the datasource with `uid`. An empty or unknown UID resolves to
/// the default datasource's type.
///
/// Runs in a `get_datasource_by_uid` span that records `datasource.type` and
/// how the `lookup.result` was reached.
pub fn datasource_type_by_uid(
  ctx: &RequestContext,
  uid: &str,
  provider: Option<&dyn DataSourceIndexProvider>,
) -> String {
  let span = tracing::debug_span!(
    "get_datasource_by_uid",
    datasource.uid = uid,
    "datasource.type" = Empty,
    datasource.name = Empty,
    lookup.result = Empty
  );
  let _entered = span.enter();

  if uid.is_empty() {
    span.record("lookup.result", "fallback_to_default");
    return default_datasource_type(ctx, provider);
  }
  let Some(provider) = provider else {
    span.record("datasource.type", GRAFANA_DATASOURCE_TYPE);
    span.record("lookup.result", "provider_nil");
    return GRAFANA_DATASOURCE_TYPE.to_string();
  };
  let Some(index) = load_index(ctx, provider) else {
    span.record("lookup.result", "index_unavailable");
    return default_datasource_type(ctx, Some(provider));
  };

  match index.lookup_by_uid(uid) {
    Some(ds) => {
      span.record("datasource.type", ds.ds_type.as_str());
      span.record("datasource.name", ds.name.as_str());
      span.record("lookup.result", "found");
      ds.ds_type.clone()
    }
    None => {
      span.record("lookup.result", "not_found_fallback_to_default");
      default_datasource_type(ctx, Some(provider))
    }
  }
}

/// A reference of type `"datasource"` without a UID points at the built-in
/// Grafana datasource.
pub fn resolve_grafana_datasource_uid<'a>(ds_type: &str, ds_uid: &'a str) -> &'a str {
  if ds_type == "datasource" && ds_uid.is_empty() {
    GRAFANA_DATASOURCE_UID
  } else {
    ds_uid
  }
}

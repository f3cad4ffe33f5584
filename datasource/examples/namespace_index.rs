use scopecache_datasource::{
  datasource_type_by_uid, default_datasource_type, resolve_grafana_datasource_uid, CachedIndexProvider,
  DataSourceIndexProvider, DataSourceInfo, RequestContext, StaticLister,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
  // RUST_LOG=scopecache=trace shows hits, misses and evictions.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  let lister = StaticLister::new()
    .with(
      "default",
      vec![
        DataSourceInfo::new("prom-main", "Prometheus", "prometheus").with_default(true),
        DataSourceInfo::new("loki-main", "Loki", "loki"),
      ],
    )
    .with("org-2", vec![DataSourceInfo::new("tempo-2", "Tempo", "tempo")]);

  let provider = CachedIndexProvider::new(lister).expect("Failed to build provider");

  let report = provider.preload(&RequestContext::background(), ["default", "org-2"]);
  println!("Preloaded {:?}, failed {}", report.loaded, report.failed.len());

  let (ctx, info) = RequestContext::for_namespace("org-2");
  println!("Namespace org-2 parsed as {:?}", info);
  let ctx = ctx.timeout(Duration::from_secs(1));

  let index = provider.index(&ctx).expect("Failed to load index");
  println!("org-2 index: {:?}", index);
  println!("Lookup 'Tempo': {:?}", index.lookup("Tempo"));

  let (ctx, _) = RequestContext::for_namespace("default");
  println!(
    "Default type in 'default': {}",
    default_datasource_type(&ctx, Some(&provider))
  );
  println!(
    "Type of 'loki-main': {}",
    datasource_type_by_uid(&ctx, "loki-main", Some(&provider))
  );
  println!(
    "UID for a bare 'datasource' reference: {}",
    resolve_grafana_datasource_uid("datasource", "")
  );

  println!("\nCache metrics: {:#?}", provider.metrics());
}

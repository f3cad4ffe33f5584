use scopecache::{scope_fn, CacheBuilder, EvictionReason};
use std::convert::Infallible;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Request {
  tenant: Option<String>,
}

fn main() {
  // Create a cache for 100 tenants with a 2-second TTL and a 500ms janitor tick.
  let cache = CacheBuilder::new()
    .capacity(100)
    .time_to_live(Duration::from_secs(2))
    .janitor_tick_interval(Duration::from_millis(500))
    .scope(scope_fn(
      |req: &Request| req.tenant.clone(),
      |_: &Request, tenant: &String| Request {
        tenant: Some(tenant.clone()),
      },
    ))
    .fetch(|req: &Request| {
      println!("  (fetching report for {:?})", req.tenant);
      thread::sleep(Duration::from_millis(100));
      Ok::<_, Infallible>(format!("report for {}", req.tenant.as_deref().unwrap_or("nobody")))
    })
    .eviction_listener(|tenant: String, _: Arc<String>, reason: EvictionReason| {
      println!("  (evicted {tenant}: {reason})");
    })
    .build()
    .expect("Failed to build cache");

  let acme = Request {
    tenant: Some("acme".to_string()),
  };

  println!("First lookup for acme:");
  let value = cache.get(&acme).unwrap();
  println!("Got: {value}");

  println!("\nSecond lookup for acme (cached):");
  let value = cache.get(&acme).unwrap();
  println!("Got: {value}");

  println!("\nLookup without a tenant (never cached):");
  let value = cache.get(&Request { tenant: None }).unwrap();
  println!("Got: {value}");

  println!("\nCache metrics: {:#?}", cache.metrics());

  println!("\nWaiting for 3 seconds for the entry to expire...");
  thread::sleep(Duration::from_secs(3));

  println!("\nCache metrics after expiration: {:#?}", cache.metrics());
}

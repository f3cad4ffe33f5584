use std::fmt;
use std::marker::PhantomData;

/// Derives the cache key from a calling context.
///
/// `key_of` returning `None` marks the call as unscoped: the cache runs the
/// fetch function directly and never stores the result.
///
/// `scoped` builds the context `preload` hands to the fetch function for a key
/// it is warming, starting from the context passed to `preload`.
pub trait KeyScope<C, K>: Send + Sync {
  fn key_of(&self, ctx: &C) -> Option<K>;

  fn scoped(&self, ctx: &C, key: &K) -> C;
}

/// A [`KeyScope`] assembled from two closures. See [`scope_fn`].
pub struct FnScope<C, K, E, S> {
  extract: E,
  scope: S,
  _marker: PhantomData<fn(&C) -> K>,
}

impl<C, K, E, S> fmt::Debug for FnScope<C, K, E, S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FnScope").finish_non_exhaustive()
  }
}

/// Builds a [`KeyScope`] from a key extractor and a context constructor.
///
/// ```
/// use scopecache::scope::{scope_fn, KeyScope};
///
/// #[derive(Default)]
/// struct Request {
///   tenant: Option<String>,
/// }
///
/// let scope = scope_fn(
///   |req: &Request| req.tenant.clone(),
///   |_req: &Request, tenant: &String| Request {
///     tenant: Some(tenant.clone()),
///   },
/// );
///
/// assert_eq!(scope.key_of(&Request::default()), None);
/// let scoped = scope.scoped(&Request::default(), &"org-2".to_string());
/// assert_eq!(scope.key_of(&scoped).as_deref(), Some("org-2"));
/// ```
pub fn scope_fn<C, K, E, S>(extract: E, scope: S) -> FnScope<C, K, E, S>
where
  E: Fn(&C) -> Option<K> + Send + Sync,
  S: Fn(&C, &K) -> C + Send + Sync,
{
  FnScope {
    extract,
    scope,
    _marker: PhantomData,
  }
}

impl<C, K, E, S> KeyScope<C, K> for FnScope<C, K, E, S>
where
  E: Fn(&C) -> Option<K> + Send + Sync,
  S: Fn(&C, &K) -> C + Send + Sync,
{
  fn key_of(&self, ctx: &C) -> Option<K> {
    (self.extract)(ctx)
  }

  fn scoped(&self, ctx: &C, key: &K) -> C {
    (self.scope)(ctx, key)
  }
}

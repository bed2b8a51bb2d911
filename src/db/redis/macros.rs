/// Read-through caching around an async computation.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues the
/// result for storage with `$ttl` seconds to live, and returns it. A failing cache
/// read is logged and treated as a miss; errors from `$block` propagate.
///
/// # Example
/// ```rust,ignore
/// let resolved = cached!(cache, CacheKey::Resolve(title.clone()), 3600, async {
///     lookup(&title).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, falling back to store");
                None
            }
        };
        match hit {
            Some(cached) => Ok(cached),
            None => match $block.await {
                Ok(value) => {
                    $cache.set_in_background(&key, &value, $ttl);
                    Ok(value)
                }
                Err(e) => Err(e),
            },
        }
    }};
}

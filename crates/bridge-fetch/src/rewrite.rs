use bridge_core::{LEGACY_PREFIX, ROUTE_PREFIX};
use url::Url;

/// Rewrites `url` from the legacy functions prefix to the bridge prefix.
///
/// Returns `None` unless `url` shares `origin`'s scheme, host and port and
/// its path starts with [`LEGACY_PREFIX`]. Query and fragment are kept.
pub fn rewrite_legacy_url(origin: &Url, url: &Url) -> Option<Url> {
    if url.origin() != origin.origin() {
        return None;
    }
    let rest = url.path().strip_prefix(LEGACY_PREFIX)?;
    let mut rewritten = url.clone();
    rewritten.set_path(&format!("{ROUTE_PREFIX}{rest}"));
    Some(rewritten)
}

/// Resolves `raw` against `origin` and rewrites it when it targets a legacy
/// function.
pub fn rewrite_legacy_str(origin: &Url, raw: &str) -> Option<Url> {
    let resolved = origin.join(raw).ok()?;
    rewrite_legacy_url(origin, &resolved)
}

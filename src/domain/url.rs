//! Joining endpoint URLs with check paths.

use url::Url;

/// Append `path` to `base` without dropping the path already present in
/// `base` (plain relative resolution would replace it).
///
/// Falls back to returning `path` unchanged when `base` is not an absolute
/// URL.
pub fn combine_url_with_path(base: &str, path: &str) -> String {
    let Ok(base_url) = Url::parse(base) else {
        return path.to_string();
    };

    let existing = base_url.path();
    let joined = if !existing.is_empty() && !path.is_empty() {
        let head = existing.strip_suffix('/').unwrap_or(existing);
        let tail = path.strip_prefix('/').unwrap_or(path);
        base_url.join(&format!("{}/{}", head, tail))
    } else {
        base_url.join(path)
    };

    match joined {
        Ok(url) => url.to_string(),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_existing_path() {
        assert_eq!(combine_url_with_path("https://a.org/x", "/y"), "https://a.org/x/y");
        assert_eq!(combine_url_with_path("https://a.org/x/", "y"), "https://a.org/x/y");
        assert_eq!(combine_url_with_path("https://a.org/x/", "/y"), "https://a.org/x/y");
    }

    #[test]
    fn bare_host() {
        assert_eq!(
            combine_url_with_path("https://a.org", "/chains.json"),
            "https://a.org/chains.json"
        );
        assert_eq!(combine_url_with_path("https://a.org", "/"), "https://a.org/");
    }

    #[test]
    fn keeps_query_on_path() {
        assert_eq!(
            combine_url_with_path("https://api.a.org:8443", "/v2/history/get_actions?limit=1"),
            "https://api.a.org:8443/v2/history/get_actions?limit=1"
        );
    }

    #[test]
    fn empty_path_resolves_to_base() {
        assert_eq!(combine_url_with_path("https://a.org/x", ""), "https://a.org/x");
    }

    #[test]
    fn invalid_base_returns_path() {
        assert_eq!(combine_url_with_path("not a url", "/y"), "/y");
        assert_eq!(combine_url_with_path("", "/bp.json"), "/bp.json");
    }
}

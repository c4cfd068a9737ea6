// URI resolution for playlist entries. Deliberately minimal: no `..`
// collapsing and no query handling, playlist URIs are expected relative to
// their own manifest's directory.

/// Returns `true` if `reference` already carries an `http://` or `https://` scheme.
fn is_absolute(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// `scheme://authority` of `base_url`, without any trailing path.
fn origin(base_url: &str) -> &str {
    let authority_start = base_url.find("://").map_or(0, |pos| pos + 3);
    match base_url[authority_start..].find('/') {
        Some(pos) => &base_url[..authority_start + pos],
        None => base_url,
    }
}

/// Resolves a playlist `reference` against the URL of the playlist it came from.
///
/// * absolute references are returned unchanged
/// * `/path` is appended to the scheme and authority of `base_url`
/// * anything else replaces the last path segment of `base_url`
///
/// ```
/// use segrab_engine::hls::resolve;
///
/// assert_eq!(resolve("seg1.ts", "http://h/dir/a.m3u8"), "http://h/dir/seg1.ts");
/// assert_eq!(resolve("/x/seg1.ts", "http://h/dir/a.m3u8"), "http://h/x/seg1.ts");
/// ```
pub fn resolve(reference: &str, base_url: &str) -> String {
    if is_absolute(reference) {
        return reference.to_string();
    }

    if reference.starts_with('/') {
        return format!("{}{}", origin(base_url), reference);
    }

    let origin = origin(base_url);
    let directory = match base_url.rfind('/') {
        // the only slashes are the ones in `scheme://`
        Some(pos) if pos >= origin.len() => &base_url[..pos],
        _ => origin,
    };
    format!("{directory}/{reference}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_reference() {
        assert_eq!(
            resolve("seg1.ts", "http://h/dir/a.m3u8"),
            "http://h/dir/seg1.ts"
        );
        assert_eq!(
            resolve("low/index.m3u8", "https://cdn.example.com/live/master.m3u8"),
            "https://cdn.example.com/live/low/index.m3u8"
        );
    }

    #[test]
    fn test_root_relative_reference() {
        assert_eq!(
            resolve("/x/seg1.ts", "http://h/dir/a.m3u8"),
            "http://h/x/seg1.ts"
        );
        assert_eq!(
            resolve("/x/seg1.ts", "https://h:8443/a/b/c.m3u8?token=1"),
            "https://h:8443/x/seg1.ts"
        );
    }

    #[test]
    fn test_absolute_reference_is_unchanged() {
        assert_eq!(
            resolve("http://other/s.ts", "http://h/dir/a.m3u8"),
            "http://other/s.ts"
        );
        assert_eq!(
            resolve("https://other/s.ts", "http://h/dir/a.m3u8"),
            "https://other/s.ts"
        );
    }

    #[test]
    fn test_no_normalization() {
        assert_eq!(
            resolve("../up/seg.ts", "http://h/dir/a.m3u8"),
            "http://h/dir/../up/seg.ts"
        );
        assert_eq!(
            resolve("seg.ts?sig=abc", "http://h/dir/a.m3u8?token=1"),
            "http://h/dir/seg.ts?sig=abc"
        );
    }

    #[test]
    fn test_base_without_path() {
        assert_eq!(resolve("seg.ts", "http://h"), "http://h/seg.ts");
        assert_eq!(resolve("/seg.ts", "http://h"), "http://h/seg.ts");
        assert_eq!(resolve("seg.ts", "http://h/"), "http://h/seg.ts");
    }
}

//! URI normalization, segment splitting and `{name}` pattern matching.
//!
//! Everything here is relative to a [`BasePath`], the URL prefix under which
//! the application is deployed. Matching never fails loudly: malformed input
//! simply does not match.

use std::{borrow::Cow, collections::BTreeMap, fmt};

/// The deployment subdirectory, e.g. `/blog` for `https://host/blog/...`.
///
/// `BasePath::none()` means the application lives at the host root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BasePath(Option<String>);

impl BasePath {
    /// No subdirectory.
    pub fn none() -> Self {
        Self(None)
    }

    /// A base path. A missing leading slash is added and trailing slashes
    /// are dropped; `""` and `"/"` mean [`none`](Self::none).
    pub fn new(path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim().trim_matches('/');
        if trimmed.is_empty() {
            return Self::none();
        }
        Self(Some(format!("/{trimmed}")))
    }

    /// Derive the base path from the entry script path, using its directory:
    /// `/shop/index.php` gives `/shop`, `/index.php` gives none.
    pub fn from_script_name(script_name: &str) -> Self {
        let script_name = script_name.replace('\\', "/");
        match script_name.rsplit_once('/') {
            Some((dir, _)) if dir != "." => Self::new(dir),
            _ => Self::none(),
        }
    }

    /// The prefix, or `""` at the root.
    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    /// Whether the application lives at the host root.
    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// Normalize a raw URI into the path routes are matched against.
    ///
    /// Drops the query string, URL-decodes (`+` is a space), strips the base
    /// path case-insensitively, then forces a single leading slash and no
    /// trailing slash (`/` stays `/`). The steps repeat until the result is
    /// stable, so `normalize(normalize(x)) == normalize(x)` holds even for
    /// doubly-encoded input.
    ///
    /// Nested percent-encoding is decoded completely: `/x/%2541` becomes
    /// `/x/A`, so a route can never receive a literal `%41`.
    pub fn normalize(&self, uri: &str) -> String {
        let mut current = self.normalize_once(uri);
        loop {
            let next = self.normalize_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn normalize_once(&self, uri: &str) -> String {
        let path = uri.split_once('?').map_or(uri, |(path, _)| path);
        let decoded = decode(path);
        let path = self.strip(&decoded);

        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return "/".to_owned();
        }
        if trimmed.starts_with('/') {
            trimmed.to_owned()
        } else {
            format!("/{trimmed}")
        }
    }

    /// Strip the base path when it is a whole-segment prefix of `path`.
    fn strip<'a>(&self, path: &'a str) -> &'a str {
        let Some(base) = self.0.as_deref() else {
            return path;
        };
        let prefixed = path
            .get(..base.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(base));
        if !prefixed {
            return path;
        }
        let rest = &path[base.len()..];
        if rest.is_empty() || rest.starts_with('/') {
            rest
        } else {
            path
        }
    }

    /// Non-empty segments of the normalized URI; `[]` for the root.
    pub fn segments(&self, uri: &str) -> Vec<String> {
        self.normalize(uri)
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Match `uri` against `pattern`, capturing `{name}` segments.
    ///
    /// Returns `None` when the segment counts differ or a literal segment
    /// differs. Placeholder names follow identifier rules
    /// (`[A-Za-z_][A-Za-z0-9_]*`); anything else in braces is compared
    /// literally. A placeholder does not capture an empty segment.
    pub fn match_pattern(&self, pattern: &str, uri: &str) -> Option<RouteParams> {
        let pattern = self.normalize(pattern);
        let uri = self.normalize(uri);
        if pattern == uri {
            return Some(RouteParams::default());
        }

        let pattern_parts: Vec<&str> = pattern.trim_matches('/').split('/').collect();
        let uri_parts: Vec<&str> = uri.trim_matches('/').split('/').collect();
        if pattern_parts.len() != uri_parts.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (part, value) in pattern_parts.iter().zip(&uri_parts) {
            match placeholder(part) {
                Some(name) if !value.is_empty() => {
                    params.insert(name.to_owned(), (*value).to_owned());
                }
                Some(_) => return None,
                None if part == value => {}
                None => return None,
            }
        }
        Some(RouteParams(params))
    }

    /// Prefix an application path with the base path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.as_str())
        } else {
            format!("{}/{path}", self.as_str())
        }
    }

    /// Resolve a redirect target: site-relative paths get the base path,
    /// absolute and protocol-relative (`//host/...`) URLs are kept.
    pub fn redirect_target(&self, target: &str) -> String {
        if target.starts_with('/') && !target.starts_with("//") {
            self.url(target)
        } else {
            target.to_owned()
        }
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode(path: &str) -> Cow<'_, str> {
    if !path.contains(['%', '+']) {
        return Cow::Borrowed(path);
    }
    let spaced = path.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

fn placeholder(segment: &str) -> Option<&str> {
    let name = segment.strip_prefix('{')?.strip_suffix('}')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// Values captured by `{name}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    /// The value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of captures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Captures in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> BasePath {
        BasePath::new("/app")
    }

    #[test]
    fn base_path_construction() {
        assert!(BasePath::new("").is_root());
        assert!(BasePath::new("/").is_root());
        assert_eq!(BasePath::new("shop/").as_str(), "/shop");
        assert_eq!(BasePath::from_script_name("/ZedCMS/index.php").as_str(), "/ZedCMS");
        assert!(BasePath::from_script_name("/index.php").is_root());
        assert!(BasePath::from_script_name("\\index.php").is_root());
        assert!(BasePath::from_script_name("index.php").is_root());
        assert_eq!(BasePath::from_script_name("/a/b/index.php").as_str(), "/a/b");
    }

    #[test]
    fn normalize_basics() {
        let root = BasePath::none();
        assert_eq!(root.normalize(""), "/");
        assert_eq!(root.normalize("/"), "/");
        assert_eq!(root.normalize("///"), "/");
        assert_eq!(root.normalize("blog/"), "/blog");
        assert_eq!(root.normalize("/blog/post/?page=2"), "/blog/post");
        assert_eq!(root.normalize("/caf%C3%A9/hello+world"), "/café/hello world");
    }

    #[test]
    fn normalize_strips_base_case_insensitively() {
        assert_eq!(app().normalize("/App/blog/post"), "/blog/post");
        assert_eq!(app().normalize("/app"), "/");
        assert_eq!(app().normalize("/APP/"), "/");
        assert_eq!(app().normalize("/application"), "/application");
        assert_eq!(app().normalize("/other/app"), "/other/app");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "",
            "/",
            "/App/blog/",
            "/app/app/x",
            "/%2541",
            "/a%2Bb",
            "x//y//",
            "/%2Fapp%2Fblog",
            "/?q=1",
            "/%FF%FE",
        ];
        for base in [BasePath::none(), app()] {
            for input in inputs {
                let once = base.normalize(input);
                assert_eq!(base.normalize(&once), once, "input {input:?} base {base}");
            }
        }
    }

    #[test]
    fn nested_encoding_is_fully_decoded() {
        let base = BasePath::none();
        assert_eq!(base.normalize("/x/%2541"), "/x/A");
        assert_eq!(base.normalize("/x/%252541"), "/x/A");
        assert_eq!(
            base.match_pattern("/x/{code}", "/x/%2541").unwrap().get("code"),
            Some("A")
        );
    }

    #[test]
    fn segments_skip_empty_parts() {
        let root = BasePath::none();
        assert!(root.segments("/").is_empty());
        assert_eq!(root.segments("/blog/post/"), vec!["blog", "post"]);
        assert_eq!(root.segments("/a//b"), vec!["a", "b"]);
        assert_eq!(app().segments("/app/admin/login?x=1"), vec!["admin", "login"]);
    }

    #[test]
    fn match_pattern_captures_placeholders() {
        let root = BasePath::none();
        let params = root.match_pattern("/blog/{slug}", "/blog/hello-world").unwrap();
        assert_eq!(params.get("slug"), Some("hello-world"));
        assert_eq!(params.len(), 1);

        let params = root
            .match_pattern("/{year}/{_slug2}", "/2024/post")
            .unwrap();
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("_slug2", "post"), ("year", "2024")]);
    }

    #[test]
    fn match_pattern_edge_cases() {
        let root = BasePath::none();
        assert_eq!(root.match_pattern("/blog/{slug}", "/blog/hello/world"), None);
        assert_eq!(root.match_pattern("/blog", "/blog/"), Some(RouteParams::default()));
        assert_eq!(root.match_pattern("/blog", "/news"), None);
        assert_eq!(root.match_pattern("/{slug}", "/"), None);
        assert_eq!(root.match_pattern("/", "/"), Some(RouteParams::default()));

        // invalid placeholder names compare literally
        assert_eq!(root.match_pattern("/{1x}", "/abc"), None);
        assert!(root.match_pattern("/{1x}", "/{1x}").is_some());
        assert_eq!(root.match_pattern("/{a-b}", "/abc"), None);
        assert_eq!(root.match_pattern("/{}", "/abc"), None);
    }

    #[test]
    fn match_pattern_normalizes_both_sides() {
        let params = app()
            .match_pattern("/post/{id}/", "/APP/post/42?preview=1")
            .unwrap();
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn url_helpers() {
        assert_eq!(app().url("/admin/login"), "/app/admin/login");
        assert_eq!(app().url("admin"), "/app/admin");
        assert_eq!(BasePath::none().url("admin"), "/admin");

        assert_eq!(app().redirect_target("/login"), "/app/login");
        assert_eq!(app().redirect_target("//cdn.example.com/x"), "//cdn.example.com/x");
        assert_eq!(app().redirect_target("https://example.com/"), "https://example.com/");
    }
}

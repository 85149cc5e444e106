use url::Url;

/// Returns the network location that bounds a crawl: lowercase host plus any
/// explicit port
///
/// Two URLs are in the same crawl scope only when their scopes are equal, so
/// `example.com`, `www.example.com` and `example.com:8080` are three different
/// scopes.
///
/// # Arguments
///
/// * `url` - The URL to extract the scope from
///
/// # Returns
///
/// * `Some(String)` - `host` or `host:port`
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_scout::url::host_scope;
///
/// let url = Url::parse("https://Example.com/path").unwrap();
/// assert_eq!(host_scope(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:9000/").unwrap();
/// assert_eq!(host_scope(&url), Some("127.0.0.1:9000".to_string()));
/// ```
pub fn host_scope(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true when both URLs share the same host scope
pub fn same_scope(a: &Url, b: &Url) -> bool {
    match (host_scope(a), host_scope(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

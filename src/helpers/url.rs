//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    let path = url_for(config, path);

    // Avoid double slashes
    if path.starts_with('/') && base.ends_with('/') {
        format!("{}{}", base.trim_end_matches('/'), path)
    } else {
        format!("{}{}", base, path)
    }
}

/// Site-relative URL of a post page
pub fn post_url(config: &SiteConfig, uid: &str) -> String {
    url_for(
        config,
        &format!("{}/{}/", config.post_dir.trim_matches('/'), uid),
    )
}

/// Absolute URL of a post page
pub fn full_post_url(config: &SiteConfig, uid: &str) -> String {
    full_url_for(
        config,
        &format!("{}/{}/", config.post_dir.trim_matches('/'), uid),
    )
}

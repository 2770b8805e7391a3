//! Defines [`BasePath`], which composes site-relative paths with the mount
//! prefix the site is served under, and [`extract_domain`], which pulls the
//! bare host out of the configured site URL.

use url::{ParseError, Url};

/// The mount prefix under which the whole site is served (e.g., `/blog` for a
/// preview deployed at `https://example.org/blog/`). An empty prefix means the
/// site is served from the domain root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasePath {
    prefix: String,
}

impl BasePath {
    /// Constructs a [`BasePath`] from a configured prefix. Trailing separators
    /// are stripped and a leading one is added if missing, so `blog/`, `/blog`
    /// and `/blog/` all yield the same prefix. `/` and the empty string yield
    /// the root.
    pub fn new(prefix: &str) -> BasePath {
        let trimmed = prefix.trim().trim_end_matches('/');
        BasePath {
            prefix: match trimmed.is_empty() || trimmed.starts_with('/') {
                true => trimmed.to_owned(),
                false => format!("/{}", trimmed),
            },
        }
    }

    /// Returns the normalized prefix (empty for the root).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Composes `path` with the mount prefix. `path` is expected to be
    /// site-rooted; a missing leading `/` is added. The result always begins
    /// with `/` and never contains a doubled separator at the join.
    pub fn site_path(&self, path: &str) -> String {
        let path = match path.starts_with('/') {
            true => path.to_owned(),
            false => format!("/{}", path),
        };
        if self.prefix.is_empty() {
            return path;
        }
        match path.as_str() {
            "/" => format!("{}/", self.prefix),
            _ => format!("{}{}", self.prefix, path),
        }
    }
}

/// Extracts the domain name (without scheme, port, or path) from the site URL.
/// Returns `None` if no domain can be determined. Bare hosts such as
/// `example.org` are accepted as well as full URLs.
pub fn extract_domain(site_url: &str) -> Option<String> {
    let site_url = site_url.trim();
    if site_url.is_empty() {
        return None;
    }
    let domain = match Url::parse(site_url) {
        Ok(url) => url.host_str().map(str::to_owned),
        Err(ParseError::RelativeUrlWithoutBase) if !site_url.contains('/') => {
            site_url.split(':').next().map(str::to_owned)
        }
        Err(_) => None,
    };
    domain.filter(|domain| !domain.is_empty())
}

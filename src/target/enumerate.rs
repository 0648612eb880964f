use std::fmt;
use std::sync::Arc;

/// A single resolved URL to probe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    url: String,
}

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Strips exactly one trailing slash from a base URL
///
/// ```
/// use subseek::target::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://x.com/"), "https://x.com");
/// assert_eq!(normalize_base_url("https://x.com//"), "https://x.com/");
/// ```
pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.strip_suffix('/').unwrap_or(base_url)
}

/// Restartable source of [`Target`]s built from a base URL and a list of paths
///
/// Blank lines are skipped, every other line is trimmed. Order and duplicates
/// are preserved. Each call to [`iter`](Self::iter) starts from the first path
/// again; the paths themselves are shared, so iterators are cheap and `'static`.
#[derive(Debug, Clone)]
pub struct PathEnumerator {
    base_url: Arc<str>,
    paths: Arc<[String]>,
}

impl PathEnumerator {
    pub fn new<I, S>(base_url: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: Vec<String> = lines
            .into_iter()
            .filter_map(|line| {
                let path = line.as_ref().trim();
                (!path.is_empty()).then(|| path.to_string())
            })
            .collect();

        Self {
            base_url: Arc::from(normalize_base_url(base_url)),
            paths: paths.into(),
        }
    }

    /// The normalized base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of targets this enumerator yields
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Starts a fresh pass over the targets
    pub fn iter(&self) -> Targets {
        Targets {
            base_url: Arc::clone(&self.base_url),
            paths: Arc::clone(&self.paths),
            next: 0,
        }
    }
}

impl IntoIterator for &PathEnumerator {
    type Item = Target;
    type IntoIter = Targets;

    fn into_iter(self) -> Targets {
        self.iter()
    }
}

/// Lazy iterator over the targets of a [`PathEnumerator`]
#[derive(Debug, Clone)]
pub struct Targets {
    base_url: Arc<str>,
    paths: Arc<[String]>,
    next: usize,
}

impl Iterator for Targets {
    type Item = Target;

    fn next(&mut self) -> Option<Target> {
        let path = self.paths.get(self.next)?;
        self.next += 1;
        Some(Target::new(format!("{}/{}", self.base_url, path)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.paths.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Targets {}

/// Enumerates the targets for `base_url` and `lines`
pub fn enumerate<I, S>(base_url: &str, lines: I) -> Targets
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PathEnumerator::new(base_url, lines).iter()
}

//! Error page rendering collaborator.
//!
//! Templating proper is outside this crate; error pages are served as-is
//! from `<errors_dir>/<code>.html` when present.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub trait ErrorRenderer: Send + Sync {
    /// The page for `code`, or `None` when no template exists.
    fn render_error(&self, code: u16) -> Option<String>;
}

/// Reads error pages from disk at render time.
#[derive(Debug, Clone)]
pub struct ErrorPages {
    dir: PathBuf,
}

impl ErrorPages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ErrorRenderer for ErrorPages {
    fn render_error(&self, code: u16) -> Option<String> {
        let path = self.dir.join(format!("{}.html", code));
        match fs::read_to_string(&path) {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::debug!(path = ?path, error = %e, "No error page template");
                None
            }
        }
    }
}

/// Error pages held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticErrorPages {
    pages: HashMap<u16, String>,
}

impl StaticErrorPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, code: u16, page: impl Into<String>) -> Self {
        self.pages.insert(code, page.into());
        self
    }
}

impl ErrorRenderer for StaticErrorPages {
    fn render_error(&self, code: u16) -> Option<String> {
        self.pages.get(&code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_pages_from_disk() {
        let dir = std::env::temp_dir().join(format!("corex-views-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("404.html"), "<h1>Not here</h1>").unwrap();

        let pages = ErrorPages::new(&dir);
        assert_eq!(pages.render_error(404).as_deref(), Some("<h1>Not here</h1>"));
        assert_eq!(pages.render_error(500), None);

        fs::remove_dir_all(dir).unwrap_or_default();
    }

    #[test]
    fn test_static_pages() {
        let pages = StaticErrorPages::new().with_page(500, "oops");
        assert_eq!(pages.render_error(500).as_deref(), Some("oops"));
        assert_eq!(pages.render_error(404), None);
    }
}

//! Template substitution and page publishing.
//!
//! The template is an ordinary HTML document with a placeholder marker where
//! the news fragment goes. A template without the marker is treated as a
//! configuration mistake: the run fails and the previous output is left
//! untouched, so the news never silently disappears from the page.

use crate::config::Config;
use crate::utils::ensure_parent_dir;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Failures that end the run unsuccessfully.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to read template {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {} does not contain the placeholder {placeholder:?}", .path.display())]
    PlaceholderMissing { path: PathBuf, placeholder: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replace every occurrence of `placeholder` in `template` with `fragment`.
///
/// Returns the new document and the number of replacements, or `None` when
/// the placeholder does not occur.
pub fn inject(template: &str, placeholder: &str, fragment: &str) -> Option<(String, usize)> {
    let count = template.matches(placeholder).count();
    if count == 0 {
        return None;
    }
    Some((template.replace(placeholder, fragment), count))
}

/// Writes the rendered fragment into the template and the result to disk.
#[derive(Debug, Clone)]
pub struct Publisher {
    template_path: PathBuf,
    output_path: PathBuf,
    placeholder: String,
}

impl Publisher {
    pub fn new(
        template_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            output_path: output_path.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.template_path,
            &config.output_path,
            &config.placeholder,
        )
    }

    /// Substitute `fragment` into the template and overwrite the output file.
    #[instrument(level = "info", skip_all, fields(template = %self.template_path.display(), output = %self.output_path.display()))]
    pub async fn publish(&self, fragment: &str) -> Result<(), PublishError> {
        let template = fs::read_to_string(&self.template_path)
            .await
            .map_err(|source| PublishError::TemplateRead {
                path: self.template_path.clone(),
                source,
            })?;

        let (page, replaced) = inject(&template, &self.placeholder, fragment).ok_or_else(|| {
            PublishError::PlaceholderMissing {
                path: self.template_path.clone(),
                placeholder: self.placeholder.clone(),
            }
        })?;
        if replaced > 1 {
            warn!(replaced, "Placeholder occurs more than once; filled every occurrence");
        }

        let write_err = |source: std::io::Error| PublishError::Write {
            path: self.output_path.clone(),
            source,
        };
        ensure_parent_dir(&self.output_path).await.map_err(write_err)?;
        fs::write(&self.output_path, page).await.map_err(write_err)?;

        info!(bytes = fragment.len(), "Published page");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PLACEHOLDER;

    const TEMPLATE: &str = "<html><body><h1>Real estate news</h1>\n<!-- NEWS_CONTENT_PLACEHOLDER -->\n</body></html>";

    #[test]
    fn test_inject_replaces_marker() {
        let (page, count) = inject(TEMPLATE, DEFAULT_PLACEHOLDER, "<ul></ul>").unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            page,
            "<html><body><h1>Real estate news</h1>\n<ul></ul>\n</body></html>"
        );
    }

    #[test]
    fn test_inject_missing_marker() {
        assert!(inject("<html></html>", DEFAULT_PLACEHOLDER, "<ul></ul>").is_none());
    }

    #[tokio::test]
    async fn test_publish_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.html");
        let output = dir.path().join("public").join("index.html");
        std::fs::write(&template, TEMPLATE).unwrap();
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        std::fs::write(&output, "stale").unwrap();

        let publisher = Publisher::new(&template, &output, DEFAULT_PLACEHOLDER);
        publisher.publish("<p>news</p>").await.unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("<h1>Real estate news</h1>"));
        assert!(written.contains("<p>news</p>"));
        assert!(!written.contains(DEFAULT_PLACEHOLDER));
        assert!(!written.contains("stale"));
    }

    #[tokio::test]
    async fn test_publish_creates_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.html");
        let output = dir.path().join("site").join("news").join("index.html");
        std::fs::write(&template, TEMPLATE).unwrap();

        Publisher::new(&template, &output, DEFAULT_PLACEHOLDER)
            .publish("<p>news</p>")
            .await
            .unwrap();
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_missing_placeholder_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.html");
        let output = dir.path().join("index.html");
        std::fs::write(&template, "<html><body>no marker</body></html>").unwrap();

        let err = Publisher::new(&template, &output, DEFAULT_PLACEHOLDER)
            .publish("<p>news</p>")
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::PlaceholderMissing { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unreadable_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = Publisher::new(dir.path().join("nope.html"), dir.path().join("index.html"), DEFAULT_PLACEHOLDER)
            .publish("<p>news</p>")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::TemplateRead { .. }));
    }

    #[tokio::test]
    async fn test_write_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.html");
        std::fs::write(&template, TEMPLATE).unwrap();

        // The output path is an existing directory.
        let err = Publisher::new(&template, dir.path(), DEFAULT_PLACEHOLDER)
            .publish("<p>news</p>")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Write { .. }));
    }
}

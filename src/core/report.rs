// src/core/report.rs

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::core::error::ScanError;
use crate::core::models::ReportFormat;

// `filename*=UTF-8''name.pdf` or `filename="name.pdf"` or `filename=name.pdf`.
static RE_DISPOSITION_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)filename\*\s*=\s*[^']*'[^']*'([^;]+)"#).unwrap());
static RE_DISPOSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)filename\s*=\s*"?([^";]+)"?"#).unwrap());

/// A rendered report as received from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportArtifact {
    /// Offered to the user as a file download.
    Pdf { file_name: String, bytes: Vec<u8> },
    /// Opened as a standalone page.
    Html { file_name: String, document: String },
}

impl ReportArtifact {
    /// Builds an artifact from the pieces of an HTTP response.
    ///
    /// The content type must match the requested format; anything else means the
    /// backend rendered the wrong thing and is reported as a `Render` failure.
    pub fn from_response_parts(
        task_id: &str,
        format: ReportFormat,
        content_type: Option<&str>,
        content_disposition: Option<&str>,
        body: Vec<u8>,
    ) -> Result<Self, ScanError> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if mime != format.content_type() {
            warn!(task_id, %format, content_type = %mime, "Report content type does not match requested format.");
            return Err(ScanError::Render(format!(
                "expected {} but the backend sent '{}'",
                format.content_type(),
                mime
            )));
        }

        let file_name = content_disposition
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| default_file_name(task_id, format));

        match format {
            ReportFormat::Pdf => Ok(ReportArtifact::Pdf { file_name, bytes: body }),
            ReportFormat::Html => {
                let document = String::from_utf8(body)
                    .map_err(|_| ScanError::Render("HTML report is not valid UTF-8".to_string()))?;
                Ok(ReportArtifact::Html { file_name, document })
            }
        }
    }

    pub fn format(&self) -> ReportFormat {
        match self {
            ReportArtifact::Pdf { .. } => ReportFormat::Pdf,
            ReportArtifact::Html { .. } => ReportFormat::Html,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            ReportArtifact::Pdf { file_name, .. } | ReportArtifact::Html { file_name, .. } => file_name,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReportArtifact::Pdf { bytes, .. } => bytes.len(),
            ReportArtifact::Html { document, .. } => document.len(),
        }
    }

    /// The `<title>` of an HTML report, if it has one.
    pub fn title(&self) -> Option<String> {
        match self {
            ReportArtifact::Html { document, .. } => html_title(document),
            ReportArtifact::Pdf { .. } => None,
        }
    }

    /// Writes the artifact into `dir` and returns the full path.
    pub async fn deliver(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        match self {
            ReportArtifact::Pdf { bytes, .. } => tokio::fs::write(&path, bytes).await?,
            ReportArtifact::Html { document, .. } => tokio::fs::write(&path, document.as_bytes()).await?,
        }
        info!(path = %path.display(), bytes = self.len(), "Report written to disk.");
        Ok(path)
    }
}

pub fn default_file_name(task_id: &str, format: ReportFormat) -> String {
    sanitize_file_name(&format!("security_report_scan_{task_id}.{}", format.extension()))
}

fn file_name_from_disposition(header: &str) -> Option<String> {
    let raw = RE_DISPOSITION_EXT
        .captures(header)
        .or_else(|| RE_DISPOSITION.captures(header))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())?;
    debug!(file_name = %raw, "Found file name in Content-Disposition.");
    let clean = sanitize_file_name(&raw);
    (!clean.is_empty()).then_some(clean)
}

/// Reduces a backend-supplied name to a single safe path component.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

fn html_title(document: &str) -> Option<String> {
    let doc = Html::parse_document(document);
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

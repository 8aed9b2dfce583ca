//! Report export as a template method: `export` fixes the step order,
//! implementations fill in the steps.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("markdown report must have a .md extension: {}", .0.display())]
    InvalidExtension(PathBuf),

    #[error("report I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub title: String,
    pub author: String,
    pub content: String,
    pub copyright: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Markdown,
    Pdf,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Pdf => "pdf",
        }
    }
}

pub trait ReportBuilder {
    fn write_head(&mut self, title: &str, author: &str) -> ReportResult<()>;
    fn write_body(&mut self, content: &str) -> ReportResult<()>;
    fn write_footer(&mut self, copyright: &str) -> ReportResult<()>;
    fn save(&mut self) -> ReportResult<()>;

    /// Run head, body, footer, save. The order cannot be changed by implementations.
    #[instrument(level = "debug", skip(self, config), fields(title = %config.title))]
    fn export(&mut self, config: &ReportConfig) -> ReportResult<()> {
        self.write_head(&config.title, &config.author)?;
        self.write_body(&config.content)?;
        self.write_footer(&config.copyright)?;
        self.save()
    }
}

/// Markdown report written to any sink.
#[derive(Debug)]
pub struct MarkdownReportBuilder<W: Write> {
    out: W,
}

impl MarkdownReportBuilder<BufWriter<File>> {
    /// Create (truncate) `path`, which must end in `.md`.
    pub fn create(path: &Path) -> ReportResult<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            return Err(ReportError::InvalidExtension(path.to_path_buf()));
        }
        debug!("creating markdown report {}", path.display());
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> MarkdownReportBuilder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportBuilder for MarkdownReportBuilder<W> {
    fn write_head(&mut self, title: &str, author: &str) -> ReportResult<()> {
        write!(self.out, "# {} \n\n", title)?;
        write!(self.out, "## by {} \n\n", author)?;
        Ok(())
    }

    fn write_body(&mut self, content: &str) -> ReportResult<()> {
        write!(self.out, "{} \n\n", content)?;
        Ok(())
    }

    fn write_footer(&mut self, copyright: &str) -> ReportResult<()> {
        write!(self.out, "{}", copyright)?;
        Ok(())
    }

    fn save(&mut self) -> ReportResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// PDF output is not produced; every step succeeds without writing.
#[derive(Debug, Default)]
pub struct PdfReportBuilder;

impl ReportBuilder for PdfReportBuilder {
    fn write_head(&mut self, _title: &str, _author: &str) -> ReportResult<()> {
        Ok(())
    }

    fn write_body(&mut self, _content: &str) -> ReportResult<()> {
        Ok(())
    }

    fn write_footer(&mut self, _copyright: &str) -> ReportResult<()> {
        Ok(())
    }

    fn save(&mut self) -> ReportResult<()> {
        Ok(())
    }
}

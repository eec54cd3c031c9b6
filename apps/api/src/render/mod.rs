//! Report rendering: layout + PDF writing, run off the request path.
//!
//! The HTTP handler gets the report filename back immediately. Layout and PDF writing
//! run on a blocking worker afterwards; failures there are logged and never reach the
//! client that triggered them.

pub mod pdf;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::layout::table::LayoutError;
use crate::layout::{layout_document, TableLayoutConfig};
use crate::models::recommendation::RecommendationRecord;

const FILENAME_PREFIX: &str = "MaterialMind_Recommendation_";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Unique report filename for one request.
pub fn report_filename(id: Uuid) -> String {
    format!("{FILENAME_PREFIX}{id}.pdf")
}

/// Lays out `record` and writes the PDF to `path`, creating the parent directory if needed.
/// Synchronous and CPU-bound.
pub fn render_report(
    record: &RecommendationRecord,
    config: &TableLayoutConfig,
    path: &Path,
) -> Result<u32, RenderError> {
    let layout = layout_document(record, config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    pdf::write_pdf(&layout, &config.geometry, path)?;
    Ok(layout.page_count)
}

/// Submits report jobs. Cheap to clone; carried in `AppState`.
#[derive(Clone)]
pub struct ReportRenderer {
    output_dir: PathBuf,
    layout_config: Arc<TableLayoutConfig>,
}

impl ReportRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, layout_config: TableLayoutConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            layout_config: Arc::new(layout_config),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Starts a render job and returns the report filename without waiting for it.
    pub fn submit(&self, record: Arc<RecommendationRecord>) -> String {
        let (filename, _handle) = self.spawn(record);
        filename
    }

    /// Starts a render job; the handle resolves to the written path.
    /// The job logs its own outcome, so dropping the handle is fine.
    fn spawn(
        &self,
        record: Arc<RecommendationRecord>,
    ) -> (String, JoinHandle<Result<PathBuf, RenderError>>) {
        let filename = report_filename(Uuid::new_v4());
        let path = self.output_dir.join(&filename);
        let config = Arc::clone(&self.layout_config);

        let handle = tokio::spawn(async move {
            let target = path.clone();
            let result = tokio::task::spawn_blocking(move || {
                render_report(&record, &config, &target)
            })
            .await
            .map_err(RenderError::from)
            .and_then(|inner| inner);

            match result {
                Ok(pages) => {
                    info!("Report written to {} ({pages} pages)", path.display());
                    Ok(path)
                }
                Err(e) => {
                    error!("Report generation failed for {}: {e}", path.display());
                    Err(e)
                }
            }
        });

        (filename, handle)
    }
}

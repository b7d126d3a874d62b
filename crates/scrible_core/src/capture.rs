//! crates/scrible_core/src/capture.rs
//!
//! Turns a user-provided file into notebook text through the extraction port.
//! Nothing here writes notebooks; callers only save once extraction succeeded.

use chrono::{DateTime, Local, Utc};
use tracing::{info, warn};

use crate::domain::{ScanFile, ScanKind};
use crate::ports::{PortError, ScanConverter, TextExtractionService};

/// A failed capture. The display text is meant for the user.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Dropped file is not an image or PDF.")]
    UnsupportedFile,
    #[error("Failed to convert PDF. Please try an image file.")]
    Conversion,
    #[error("No text extracted from that file.")]
    NothingExtracted,
    #[error("{0}")]
    Extraction(String),
}

/// Extracts and trims the text in `file`.
///
/// The extraction backend only reads images, so a PDF is first reduced to an
/// image of its first page.
pub async fn capture_text(
    converter: &dyn ScanConverter,
    service: &dyn TextExtractionService,
    file: &ScanFile,
) -> Result<String, CaptureError> {
    let Some(kind) = file.kind() else {
        warn!("Rejected {} ({:?}) for extraction", file.file_name, file.content_type);
        return Err(CaptureError::UnsupportedFile);
    };
    info!("Extracting text from {} as {:?}", file.file_name, kind);

    let rendered;
    let image = match kind {
        ScanKind::Image => file,
        ScanKind::Pdf => {
            rendered = converter.first_page_image(file).await.map_err(|e| {
                warn!("Could not render {}: {}", file.file_name, e);
                CaptureError::Conversion
            })?;
            if rendered.kind() != Some(ScanKind::Image) {
                warn!("Rendering {} did not produce an image", file.file_name);
                return Err(CaptureError::Conversion);
            }
            &rendered
        }
    };

    let text = service
        .extract_text(image)
        .await
        .map_err(|e| match e {
            PortError::Unavailable(message) | PortError::Unexpected(message) => {
                CaptureError::Extraction(message)
            }
        })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(CaptureError::NothingExtracted);
    }
    Ok(text.to_string())
}

/// The title given to a capture saved without one, e.g. `Notebook 10/18/2026, 9:30:00 AM`.
pub fn default_title(now: DateTime<Utc>) -> String {
    format!(
        "Notebook {}",
        now.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p")
    )
}

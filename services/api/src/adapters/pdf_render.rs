//! services/api/src/adapters/pdf_render.rs
//!
//! This module contains the MuPDF implementation of the `ScanConverter` port.
//! The first page of a PDF is rasterized and encoded as a JPEG, which is what the
//! OCR backend knows how to read.

use async_trait::async_trait;
use image::{codecs::jpeg::JpegEncoder, RgbImage};
use mupdf::{Colorspace, Document, Matrix};
use scrible_core::domain::ScanFile;
use scrible_core::ports::{PortError, PortResult, ScanConverter};
use tracing::debug;

/// Rendered pages are twice the PDF's nominal size.
const RENDER_SCALE: f32 = 2.0;
const JPEG_QUALITY: u8 = 95;
pub const RENDERED_FILE_NAME: &str = "pdf-page-1.jpg";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone, Copy, Debug, Default)]
pub struct MupdfConverter;

impl MupdfConverter {
    pub fn new() -> Self {
        Self
    }
}

fn render_error(e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(format!("Failed to render PDF: {}", e))
}

/// Rasterizes page one of `pdf` and returns the JPEG bytes.
fn render_first_page(pdf: &[u8]) -> PortResult<Vec<u8>> {
    let doc = Document::from_bytes(pdf, "application/pdf").map_err(render_error)?;
    if doc.page_count().map_err(render_error)? < 1 {
        return Err(render_error("the document has no pages"));
    }
    let page = doc.load_page(0).map_err(render_error)?;

    let matrix = Matrix::new_scale(RENDER_SCALE, RENDER_SCALE);
    let pixmap = page
        .to_pixmap(&matrix, &Colorspace::device_rgb(), false, false)
        .map_err(render_error)?;

    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(render_error(format!("unexpected pixel layout with {} channels", n)));
    }
    let rgb: Vec<u8> = pixmap
        .samples()
        .chunks_exact(n)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let img = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| render_error("pixel buffer does not match the page size"))?;

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(&img)
        .map_err(render_error)?;
    debug!("Rendered a {}x{} first page ({} bytes)", width, height, jpeg.len());
    Ok(jpeg)
}

//=========================================================================================
// `ScanConverter` Trait Implementation
//=========================================================================================

#[async_trait]
impl ScanConverter for MupdfConverter {
    async fn first_page_image(&self, file: &ScanFile) -> PortResult<ScanFile> {
        let pdf = file.bytes.clone();
        let jpeg = tokio::task::spawn_blocking(move || render_first_page(&pdf))
            .await
            .map_err(|e| PortError::Unexpected(format!("Render task failed: {}", e)))??;

        Ok(ScanFile {
            file_name: RENDERED_FILE_NAME.to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: jpeg,
        })
    }
}

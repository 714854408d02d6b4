//! mupdf-backed PDF surface.

use crate::{
    DocumentSurface, LinkRegion, LinkTarget, PageRaster, SurfaceError, SurfaceResult,
};
use kurbo::{Rect, Size};
use mupdf::{Colorspace, Document, Matrix};
use std::path::Path;

/// Renders PDF pages via mupdf and exposes their link annotations.
pub struct PdfSurface {
    doc: Document,
    page_count: usize,
}

impl PdfSurface {
    /// Open a document from disk.
    pub fn open(path: &Path) -> SurfaceResult<Self> {
        let doc = Document::open(path.to_string_lossy().as_ref())
            .map_err(|e| SurfaceError::Open(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| SurfaceError::Open(e.to_string()))? as usize;
        log::info!("opened {} ({page_count} pages)", path.display());
        Ok(Self { doc, page_count })
    }

    fn load_page(&self, page: usize) -> SurfaceResult<mupdf::Page> {
        if page >= self.page_count {
            return Err(SurfaceError::PageOutOfRange(page));
        }
        self.doc
            .load_page(page as i32)
            .map_err(|e| SurfaceError::Render {
                page,
                reason: e.to_string(),
            })
    }
}

impl DocumentSurface for PdfSurface {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, page: usize) -> SurfaceResult<Size> {
        let bounds = self
            .load_page(page)?
            .bounds()
            .map_err(|e| SurfaceError::Render {
                page,
                reason: e.to_string(),
            })?;
        Ok(Size::new(
            (bounds.x1 - bounds.x0) as f64,
            (bounds.y1 - bounds.y0) as f64,
        ))
    }

    fn render_page(&self, page: usize, scale: f32) -> SurfaceResult<PageRaster> {
        let mupdf_page = self.load_page(page)?;
        let transform = Matrix::new_scale(scale, scale);
        let rgb = Colorspace::device_rgb();
        let pixmap = mupdf_page
            .to_pixmap(&transform, &rgb, false, false)
            .map_err(|e| SurfaceError::Render {
                page,
                reason: e.to_string(),
            })?;
        pixmap_to_rgb(&pixmap).ok_or_else(|| SurfaceError::Render {
            page,
            reason: "pixmap buffer size mismatch".into(),
        })
    }

    fn links(&self, page: usize, scale: f32) -> Vec<LinkRegion> {
        let Ok(mupdf_page) = self.load_page(page) else {
            return Vec::new();
        };
        let Ok(links) = mupdf_page.links() else {
            return Vec::new();
        };

        links
            .filter_map(|link| {
                let target = if let Some(dest) = link.dest {
                    Some(LinkTarget::Internal {
                        page: dest.loc.page_number as usize,
                    })
                } else if !link.uri.is_empty() {
                    Some(LinkTarget::External {
                        uri: link.uri.clone(),
                    })
                } else {
                    None
                }?;

                let bounds = link.bounds;
                if bounds.is_empty() {
                    return None;
                }
                let scale = scale as f64;
                let rect = Rect::new(
                    bounds.x0.min(bounds.x1) as f64 * scale,
                    bounds.y0.min(bounds.y1) as f64 * scale,
                    bounds.x0.max(bounds.x1) as f64 * scale,
                    bounds.y0.max(bounds.y1) as f64 * scale,
                );
                Some(LinkRegion { rect, target })
            })
            .collect()
    }
}

/// Repack a pixmap into tight RGB rows. mupdf rows may carry padding, so
/// copy row by row through the stride.
fn pixmap_to_rgb(pixmap: &mupdf::Pixmap) -> Option<PageRaster> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return None;
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return None;
    }

    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            rgb.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                rgb.extend_from_slice(&px[..3]);
            }
        }
    }

    Some(PageRaster {
        width: width as u32,
        height: height as u32,
        rgb,
    })
}

//! Document surface abstraction.
//!
//! The annotation layer floats over a rendered document. It never depends
//! on how the document is rendered; this crate defines the contract and
//! ships two implementations: a mupdf-backed PDF rasterizer (feature
//! `pdf`, on by default) and a blank fallback surface.

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfSurface;

use kurbo::{Point, Rect, Size};
use thiserror::Error;

/// Surface errors. All degrade to a notice plus a blank page; none crash
/// the process.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("failed to render page {page}: {reason}")]
    Render { page: usize, reason: String },
    #[error("page {0} out of range")]
    PageOutOfRange(usize),
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Where a hyperlink region leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// An external URI, opened in the system browser.
    External { uri: String },
    /// Another page of the same document.
    Internal { page: usize },
}

/// A clickable hyperlink region on a rendered page, in rendered-pixel
/// coordinates (already multiplied by the raster scale).
#[derive(Debug, Clone)]
pub struct LinkRegion {
    pub rect: Rect,
    pub target: LinkTarget,
}

impl LinkRegion {
    /// Check whether a container-local point hits this region.
    pub fn hit_test(&self, point: Point) -> bool {
        self.rect.contains(point)
    }
}

/// A rasterized page: tightly packed RGB8 pixels.
#[derive(Debug, Clone)]
pub struct PageRaster {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Trait for document rendering backends.
///
/// Implementations rasterize pages and optionally expose their hyperlink
/// regions. The annotation layer only ever sees the resulting container
/// rectangle.
pub trait DocumentSurface {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page size in document points.
    fn page_size(&self, page: usize) -> SurfaceResult<Size>;

    /// Rasterize a page at the given scale factor.
    fn render_page(&self, page: usize, scale: f32) -> SurfaceResult<PageRaster>;

    /// Hyperlink regions of a page, scaled to rendered pixels. Surfaces
    /// without link support return an empty list.
    fn links(&self, page: usize, scale: f32) -> Vec<LinkRegion>;
}

/// Activate a link. External targets open in a new browsing context (the
/// system browser); internal targets return the page to navigate to.
pub fn activate_link(target: &LinkTarget) -> Option<usize> {
    match target {
        LinkTarget::External { uri } => {
            if let Err(e) = open::that_detached(uri) {
                log::warn!("failed to open {uri}: {e}");
            }
            None
        }
        LinkTarget::Internal { page } => Some(*page),
    }
}

/// Fallback surface used when no document could be opened: one blank
/// white page, no links.
#[derive(Debug)]
pub struct BlankSurface {
    size: Size,
}

impl BlankSurface {
    pub fn new() -> Self {
        // US letter in points.
        Self {
            size: Size::new(612.0, 792.0),
        }
    }
}

impl Default for BlankSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSurface for BlankSurface {
    fn page_count(&self) -> usize {
        1
    }

    fn page_size(&self, page: usize) -> SurfaceResult<Size> {
        if page != 0 {
            return Err(SurfaceError::PageOutOfRange(page));
        }
        Ok(self.size)
    }

    fn render_page(&self, page: usize, scale: f32) -> SurfaceResult<PageRaster> {
        if page != 0 {
            return Err(SurfaceError::PageOutOfRange(page));
        }
        let width = (self.size.width as f32 * scale) as u32;
        let height = (self.size.height as f32 * scale) as u32;
        Ok(PageRaster {
            width,
            height,
            rgb: vec![0xff; width as usize * height as usize * 3],
        })
    }

    fn links(&self, _page: usize, _scale: f32) -> Vec<LinkRegion> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_surface_has_one_page() {
        let surface = BlankSurface::new();
        assert_eq!(surface.page_count(), 1);
        assert!(surface.page_size(0).is_ok());
        assert!(matches!(
            surface.page_size(3),
            Err(SurfaceError::PageOutOfRange(3))
        ));
    }

    #[test]
    fn test_blank_raster_is_white_and_tightly_packed() {
        let surface = BlankSurface::new();
        let raster = surface.render_page(0, 1.0).unwrap();
        assert_eq!(
            raster.rgb.len(),
            raster.width as usize * raster.height as usize * 3
        );
        assert!(raster.rgb.iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_internal_link_activation_returns_page() {
        assert_eq!(activate_link(&LinkTarget::Internal { page: 4 }), Some(4));
    }

    #[test]
    fn test_link_region_hit_test() {
        let region = LinkRegion {
            rect: Rect::new(10.0, 10.0, 110.0, 30.0),
            target: LinkTarget::Internal { page: 0 },
        };
        assert!(region.hit_test(Point::new(50.0, 20.0)));
        assert!(!region.hit_test(Point::new(50.0, 40.0)));
    }
}

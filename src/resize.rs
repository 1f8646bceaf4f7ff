//! # Image Resize Module
//!
//! Questo modulo calcola le dimensioni di destinazione per il ridimensionamento.
//!
//! ## Caratteristiche
//! - **Solo riduzione**: Nessun upscaling, mai
//! - **Fit inside**: Il lato dominante diventa esattamente `max_dimension`,
//!   l'altro lato viene scalato mantenendo l'aspect ratio
//! - **Nessun lavoro inutile**: Immagini già entro il limite non vengono toccate
//!
//! ## Esempio
//! ```rust,ignore
//! let dims = Dimensions::new(4000, 3000);
//! assert_eq!(fit_within(dims, 1920), Some(Dimensions::new(1920, 1440)));
//! assert_eq!(fit_within(Dimensions::new(800, 600), 1920), None);
//! ```

use std::fmt;

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Longer side in pixels
    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Whether both sides are already within `max_dimension`
    pub fn fits_within(&self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Target dimensions so that the longer side becomes `max_dimension`.
///
/// Returns `None` when the image already fits, so callers never re-encode
/// or enlarge images inside the bound.
pub fn fit_within(source: Dimensions, max_dimension: u32) -> Option<Dimensions> {
    if source.fits_within(max_dimension) || max_dimension == 0 {
        return None;
    }

    let target = if source.width >= source.height {
        Dimensions::new(max_dimension, scale_side(source.height, max_dimension, source.width))
    } else {
        Dimensions::new(scale_side(source.width, max_dimension, source.height), max_dimension)
    };

    Some(target)
}

/// `side * numerator / denominator`, rounded to nearest, never below one pixel
fn scale_side(side: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (side as u64 * numerator as u64 + denominator as u64 / 2) / denominator as u64;
    scaled.clamp(1, numerator as u64) as u32
}

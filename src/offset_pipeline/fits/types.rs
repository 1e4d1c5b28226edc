//! FITS image data types

/// A decoded primary-HDU pixel grid.
///
/// Pixel values are physical values (BSCALE/BZERO already applied),
/// stored row-major as `f32` regardless of the on-disk BITPIX.
#[derive(Debug, Clone)]
pub struct FitsImage {
    /// Width of the image in pixels (NAXIS1)
    pub width: usize,
    /// Height of the image in pixels (NAXIS2)
    pub height: usize,
    /// Row-major pixel data, `width * height` values
    pub data: Vec<f32>,
}

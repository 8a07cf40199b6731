use image::ImageFormat;
use std::path::Path;
use tracing::info;

use super::Rasterize;
use crate::errors::DashError;

/// Rasterizes `region` at `width`x`height` and writes it as a PNG.
pub fn export_png(region: &dyn Rasterize, width: u32, height: u32, path: &Path) -> Result<(), DashError> {
    let raster = region.rasterize(width, height)?;
    raster.save_with_format(path, ImageFormat::Png)?;
    info!("Saved {}x{} PNG to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    struct SolidRegion;

    impl Rasterize for SolidRegion {
        fn rasterize(&self, width: u32, height: u32) -> Result<RgbImage, DashError> {
            Ok(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
        }
    }

    #[test]
    fn test_png_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.png");

        export_png(&SolidRegion, 320, 200, &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 200));
        assert_eq!(decoded.to_rgb8().get_pixel(10, 10), &Rgb([255, 255, 255]));
    }
}

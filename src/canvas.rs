use image::imageops::{self, FilterType};
use image::RgbImage;
use raqote::{AntialiasMode, DrawOptions, DrawTarget, SolidSource, Source};

use crate::color::Rgb;
use crate::dot::Dot;
use crate::error::{invalid_config, Result};

/// The supersampled drawing surface shared by every layer of a render.
///
/// Starts opaque black. Dots are filled without antialiasing, so a later dot replaces
/// earlier pixels outright; smoothing comes from the final downsample.
pub struct Canvas {
    dt: DrawTarget,
    width: u32,
    height: u32,
    scale: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32, scale: u32) -> Result<Self> {
        if scale == 0 {
            return Err(invalid_config("scale must be at least 1"));
        }
        let dim = |v: u32| {
            v.checked_mul(scale)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| {
                    invalid_config(format!(
                        "canvas of {}x{} at scale {} is too large",
                        width, height, scale
                    ))
                })
        };
        let mut dt = DrawTarget::new(dim(width)?, dim(height)?);
        dt.clear(SolidSource::from_unpremultiplied_argb(0xff, 0, 0, 0));
        Ok(Canvas {
            dt,
            width,
            height,
            scale,
        })
    }

    /// Source-resolution width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source-resolution height.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn draw(&mut self, dot: &Dot) {
        let Rgb([r, g, b]) = dot.color;
        let source = Source::Solid(SolidSource::from_unpremultiplied_argb(0xff, r, g, b));
        let options = DrawOptions {
            antialias: AntialiasMode::None,
            ..DrawOptions::new()
        };
        self.dt.fill(&dot.path(), &source, &options);
    }

    /// The supersampled pixels, alpha flattened onto black.
    pub fn to_image(&self) -> RgbImage {
        let (w, h) = (self.dt.width() as u32, self.dt.height() as u32);
        let mut out = RgbImage::new(w, h);
        for (px, &argb) in out.pixels_mut().zip(self.dt.get_data()) {
            // Premultiplied, so compositing onto black is just dropping alpha.
            let [b, g, r, _a] = argb.to_le_bytes();
            *px = image::Rgb([r, g, b]);
        }
        out
    }

    /// Resamples down to source resolution with a Lanczos filter.
    pub fn downsample(self) -> RgbImage {
        if self.width == 0 || self.height == 0 {
            return RgbImage::new(self.width, self.height);
        }
        let full = self.to_image();
        if self.scale == 1 {
            return full;
        }
        imageops::resize(&full, self.width, self.height, FilterType::Lanczos3)
    }
}

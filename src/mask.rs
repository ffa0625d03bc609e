use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{invalid_config, Result};

/// Default tolerance for [`MaskRule::Near`], in RGB-cube units.
pub const DEFAULT_TOLERANCE: f64 = 40.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Classifies a single pixel as inside or outside a color region.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MaskRule {
    /// `channel` is brighter than `threshold` and beats both other channels by more than
    /// `margin`.
    Dominant {
        channel: Channel,
        threshold: u8,
        margin: u8,
    },
    /// All channels lie in `min..=max` and differ from each other by at most `spread`.
    Neutral { spread: u8, min: u8, max: u8 },
    /// Within `tolerance` (inclusive) of `target`, by Euclidean distance in RGB space.
    Near { target: Rgb, tolerance: f64 },
}

impl MaskRule {
    pub fn near(target: Rgb, tolerance: f64) -> Self {
        MaskRule::Near { target, tolerance }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            MaskRule::Dominant { .. } => Ok(()),
            MaskRule::Neutral { min, max, .. } if min > max => Err(invalid_config(format!(
                "neutral band is empty: min {} > max {}",
                min, max
            ))),
            MaskRule::Neutral { .. } => Ok(()),
            MaskRule::Near { tolerance, .. } if !(tolerance >= 0.0 && tolerance.is_finite()) => {
                Err(invalid_config(format!(
                    "tolerance must be a finite non-negative number, got {}",
                    tolerance
                )))
            }
            MaskRule::Near { .. } => Ok(()),
        }
    }

    pub fn matches(&self, px: Rgb) -> bool {
        match *self {
            MaskRule::Dominant {
                channel,
                threshold,
                margin,
            } => {
                let i = channel.index();
                let v = u16::from(px.0[i]);
                let margin = u16::from(margin);
                v > u16::from(threshold)
                    && (0..3)
                        .filter(|&j| j != i)
                        .all(|j| v > u16::from(px.0[j]) + margin)
            }
            MaskRule::Neutral { spread, min, max } => {
                let hi = px.r().max(px.g()).max(px.b());
                let lo = px.r().min(px.g()).min(px.b());
                hi - lo <= spread && lo >= min && hi <= max
            }
            MaskRule::Near { target, tolerance } => px.distance(target) <= tolerance,
        }
    }
}

/// Per-pixel region membership, row-major, with the same dimensions as its source.
#[derive(Clone, PartialEq, Eq)]
pub struct ColorMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl std::fmt::Debug for ColorMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("count", &self.count())
            .finish()
    }
}

impl ColorMask {
    pub fn build(source: &RgbImage, rule: &MaskRule) -> Self {
        let bits = source.pixels().map(|&px| rule.matches(px.into())).collect();
        ColorMask {
            width: source.width(),
            height: source.height(),
            bits,
        }
    }

    /// Builds a mask from a row-major boolean grid.
    ///
    /// # Panics
    ///
    /// Panics if `bits.len() != width * height`.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Self {
        assert_eq!(
            bits.len(),
            width as usize * height as usize,
            "mask size does not match dimensions"
        );
        ColorMask {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `false` for coordinates outside the mask.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

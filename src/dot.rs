use raqote::{Path, PathBuilder};

use crate::color::Rgb;
use crate::config::{DotLayerConfig, Shape};
use crate::distance::DistanceField;
use crate::rand::Rng;
use crate::sampler::Candidate;

/// Minimum clearance, in source pixels, between a dot's edge and its region's boundary.
pub const EDGE_MARGIN: f64 = 0.6;
/// Width of the band along the boundary over which dots shrink.
pub const EDGE_BAND: f64 = 5.0;
/// Dots at the boundary are drawn at this fraction of their size.
const EDGE_FLOOR: f64 = 0.6;
const SMALL: (f64, f64) = (0.5, 0.8);
const LARGE: (f64, f64) = (1.1, 1.6);
/// Corner radius of a rounded square, relative to the dot radius.
const CORNER: f64 = 0.25;
/// Cubic Bézier handle length for a quarter circle of unit radius.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// A filled shape on the supersampled canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub shape: Shape,
    pub color: Rgb,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Placement {
    Draw(Dot),
    /// Closer than [`EDGE_MARGIN`] to the region boundary.
    TooCloseToEdge,
    /// Final radius below the visibility threshold.
    TooSmall,
}

/// Decides whether and how big a dot is drawn at each candidate of one layer.
pub struct DotRenderer<'a> {
    field: &'a DistanceField,
    config: &'a DotLayerConfig,
    scale: f64,
}

impl<'a> DotRenderer<'a> {
    pub fn new(field: &'a DistanceField, config: &'a DotLayerConfig, scale: u32) -> Self {
        DotRenderer {
            field,
            config,
            scale: f64::from(scale),
        }
    }

    pub fn place(&self, candidate: &Candidate, rng: &mut Rng) -> Placement {
        let d = self.field.get(candidate.px, candidate.py);
        if d <= EDGE_MARGIN {
            return Placement::TooCloseToEdge;
        }
        let edge = (d / EDGE_BAND).min(1.0);

        let (lo, hi) = if rng.odds(self.config.ratio) {
            SMALL
        } else {
            LARGE
        };
        let mut radius = self.config.radius * rng.uniform(lo, hi);
        radius *= EDGE_FLOOR + (1.0 - EDGE_FLOOR) * edge;
        radius *= self.scale;
        radius = radius.min((d - EDGE_MARGIN) * self.scale);

        if radius <= EDGE_MARGIN * self.scale {
            return Placement::TooSmall;
        }
        Placement::Draw(Dot {
            x: candidate.x,
            y: candidate.y,
            radius,
            shape: self.config.shape,
            color: self.config.color,
        })
    }
}

impl Dot {
    pub fn corner_radius(&self) -> f64 {
        match self.shape {
            Shape::Circle => self.radius,
            Shape::RoundedSquare => CORNER * self.radius,
        }
    }

    /// Outline of the dot. A circle is the rounded square whose corners meet.
    pub fn path(&self) -> Path {
        let (x, y, r) = (self.x as f32, self.y as f32, self.radius as f32);
        let c = self.corner_radius() as f32;
        let k = c * KAPPA as f32;
        let (left, right, top, bottom) = (x - r, x + r, y - r, y + r);

        let mut pb = PathBuilder::new();
        pb.move_to(left + c, top);
        pb.line_to(right - c, top);
        pb.cubic_to(right - c + k, top, right, top + c - k, right, top + c);
        pb.line_to(right, bottom - c);
        pb.cubic_to(right, bottom - c + k, right - c + k, bottom, right - c, bottom);
        pb.line_to(left + c, bottom);
        pb.cubic_to(left + c - k, bottom, left, bottom - c + k, left, bottom - c);
        pb.line_to(left, top + c);
        pb.cubic_to(left, top + c - k, left + c - k, top, left + c, top);
        pb.close();
        pb.finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mask::ColorMask;

    fn config(radius: f64, ratio: f64) -> DotLayerConfig {
        DotLayerConfig {
            radius,
            density: 4,
            jitter: 0.0,
            ratio,
            shape: Shape::Circle,
            color: Rgb::new(255, 0, 0),
        }
    }

    /// A disc of radius 12 centered in a 31x31 image.
    fn disc_field() -> DistanceField {
        let bits = (0..31 * 31)
            .map(|i| {
                let (x, y) = (i % 31 - 15, i / 31 - 15);
                x * x + y * y <= 144
            })
            .collect();
        DistanceField::from_mask(&ColorMask::from_bits(31, 31, bits))
    }

    fn candidate_at(px: u32, py: u32, scale: f64) -> Candidate {
        Candidate {
            x: f64::from(px) * scale,
            y: f64::from(py) * scale,
            px,
            py,
        }
    }

    #[test]
    fn test_rejects_at_edge() {
        let field = disc_field();
        let config = config(5.0, 0.5);
        let renderer = DotRenderer::new(&field, &config, 3);
        let mut rng = Rng::seeded(0);
        // Outside the disc.
        assert_eq!(
            renderer.place(&candidate_at(0, 0, 3.0), &mut rng),
            Placement::TooCloseToEdge
        );
        // Rim pixel, distance 1: clamped to 0.4 px, below the visibility threshold.
        assert_eq!(field.get(15, 3), 1.0);
        assert_eq!(
            renderer.place(&candidate_at(15, 3, 3.0), &mut rng),
            Placement::TooSmall
        );
    }

    #[test]
    fn test_zero_radius_never_draws() {
        let field = disc_field();
        let config = config(0.0, 0.5);
        let renderer = DotRenderer::new(&field, &config, 3);
        let mut rng = Rng::seeded(11);
        for py in 0..31 {
            for px in 0..31 {
                let placement = renderer.place(&candidate_at(px, py, 3.0), &mut rng);
                assert!(!matches!(placement, Placement::Draw(_)));
            }
        }
    }

    #[test]
    fn test_radius_respects_margin() {
        let field = disc_field();
        for scale in [1, 2, 3, 5] {
            let config = config(4.0, 0.3);
            let renderer = DotRenderer::new(&field, &config, scale);
            let s = f64::from(scale);
            let mut rng = Rng::seeded(u64::from(scale));
            let mut drawn = 0;
            for py in 0..31 {
                for px in 0..31 {
                    let d = field.get(px, py);
                    if let Placement::Draw(dot) = renderer.place(&candidate_at(px, py, s), &mut rng)
                    {
                        drawn += 1;
                        let r = dot.radius / s;
                        assert!(r <= d - EDGE_MARGIN + 1e-9, "r = {}, d = {}", r, d);
                        assert!(r > EDGE_MARGIN);
                        assert_eq!((dot.x, dot.y), (f64::from(px) * s, f64::from(py) * s));
                    }
                }
            }
            assert!(drawn > 100, "scale {}: only {} dots", scale, drawn);
        }
    }

    #[test]
    fn test_size_classes_deep_inside() {
        // At the center the edge factor is 1 and the margin clamp is far away, so the
        // radius is exactly the configured radius times the size multiplier.
        let field = disc_field();
        assert_eq!(field.get(15, 15), 145f64.sqrt());
        let center = candidate_at(15, 15, 1.0);
        let mut rng = Rng::seeded(8);

        let small = config(2.0, 1.0);
        let renderer = DotRenderer::new(&field, &small, 1);
        for _ in 0..200 {
            let Placement::Draw(dot) = renderer.place(&center, &mut rng) else {
                panic!("center dot should draw");
            };
            assert!((1.0..1.6).contains(&dot.radius), "{}", dot.radius);
        }

        let large = config(2.0, 0.0);
        let renderer = DotRenderer::new(&field, &large, 1);
        for _ in 0..200 {
            let Placement::Draw(dot) = renderer.place(&center, &mut rng) else {
                panic!("center dot should draw");
            };
            assert!((2.2..3.2).contains(&dot.radius), "{}", dot.radius);
        }
    }

    #[test]
    fn test_edge_band_attenuates() {
        // At distance 3 the edge factor is 0.6, so dots shrink to 84%.
        let bits = (0..11).map(|x| (1..=5).contains(&x) || (7..=9).contains(&x)).collect();
        let field = DistanceField::from_mask(&ColorMask::from_bits(11, 1, bits));
        assert_eq!(field.get(3, 0), 3.0);
        let config = config(1.0, 0.0);
        let renderer = DotRenderer::new(&field, &config, 1);
        let mut rng = Rng::seeded(21);
        for _ in 0..100 {
            if let Placement::Draw(dot) = renderer.place(&candidate_at(3, 0, 1.0), &mut rng) {
                assert!(dot.radius >= 1.1 * 0.84 - 1e-9 && dot.radius < 1.6 * 0.84);
            } else {
                panic!("distance 3 leaves room for a dot");
            }
        }
    }

    #[test]
    fn test_path_bounds() {
        for shape in [Shape::Circle, Shape::RoundedSquare] {
            let dot = Dot {
                x: 10.0,
                y: 20.0,
                radius: 4.0,
                shape,
                color: Rgb::BLACK,
            };
            // The path exists and is closed; its control points stay in the bounding square.
            let path = dot.path();
            assert!(!path.ops.is_empty());
            for op in &path.ops {
                let points: Vec<raqote::Point> = match *op {
                    raqote::PathOp::MoveTo(p) | raqote::PathOp::LineTo(p) => vec![p],
                    raqote::PathOp::QuadTo(a, b) => vec![a, b],
                    raqote::PathOp::CubicTo(a, b, c) => vec![a, b, c],
                    raqote::PathOp::Close => vec![],
                };
                for p in points {
                    assert!((6.0..=14.0).contains(&p.x) && (16.0..=24.0).contains(&p.y));
                }
            }
        }
        let square = Dot {
            x: 0.0,
            y: 0.0,
            radius: 8.0,
            shape: Shape::RoundedSquare,
            color: Rgb::BLACK,
        };
        assert_eq!(square.corner_radius(), 2.0);
    }
}

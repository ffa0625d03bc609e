use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{invalid_config, Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    Circle,
    #[serde(alias = "square")]
    RoundedSquare,
}

impl FromStr for Shape {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "circle" => Ok(Shape::Circle),
            "square" | "rounded-square" => Ok(Shape::RoundedSquare),
            _ => Err(invalid_config(format!("unrecognized shape {:?}", s))),
        }
    }
}

/// How one color layer is turned into dots. Lengths are in source-image pixels.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DotLayerConfig {
    /// Base dot radius.
    pub radius: f64,
    /// Side length of a sampling cell; at most one dot is placed per cell.
    pub density: u32,
    /// Largest random offset applied to a sample on each axis.
    pub jitter: f64,
    /// Probability that a dot is drawn small rather than large.
    pub ratio: f64,
    pub shape: Shape,
    pub color: Rgb,
}

impl DotLayerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.density == 0 {
            return Err(invalid_config("density must be at least 1"));
        }
        if !(self.radius >= 0.0 && self.radius.is_finite()) {
            return Err(invalid_config(format!(
                "radius must be a finite non-negative number, got {}",
                self.radius
            )));
        }
        if !(self.jitter >= 0.0 && self.jitter.is_finite()) {
            return Err(invalid_config(format!(
                "jitter must be a finite non-negative number, got {}",
                self.jitter
            )));
        }
        if !(0.0..=1.0).contains(&self.ratio) {
            return Err(invalid_config(format!(
                "ratio must lie in [0, 1], got {}",
                self.ratio
            )));
        }
        Ok(())
    }

    pub fn with_overrides(mut self, overrides: &LayerOverrides) -> Self {
        let LayerOverrides {
            radius,
            density,
            jitter,
            ratio,
            shape,
            color,
        } = *overrides;
        self.radius = radius.unwrap_or(self.radius);
        self.density = density.unwrap_or(self.density);
        self.jitter = jitter.unwrap_or(self.jitter);
        self.ratio = ratio.unwrap_or(self.ratio);
        self.shape = shape.unwrap_or(self.shape);
        self.color = color.unwrap_or(self.color);
        self
    }
}

/// Partial [`DotLayerConfig`], parsed from `key=value` pairs separated by commas, e.g.
/// `radius=2,shape=circle,color=#00ff00`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LayerOverrides {
    pub radius: Option<f64>,
    pub density: Option<u32>,
    pub jitter: Option<f64>,
    pub ratio: Option<f64>,
    pub shape: Option<Shape>,
    pub color: Option<Rgb>,
}

impl FromStr for LayerOverrides {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        fn number<T: FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| invalid_config(format!("{}: cannot parse {:?}", key, value)))
        }

        let mut overrides = LayerOverrides::default();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid_config(format!("expected key=value, got {:?}", pair)))?;
            let (key, value) = (key.trim(), value.trim());
            match key {
                "radius" => overrides.radius = Some(number(key, value)?),
                "density" => overrides.density = Some(number(key, value)?),
                "jitter" => overrides.jitter = Some(number(key, value)?),
                "ratio" => overrides.ratio = Some(number(key, value)?),
                "shape" => overrides.shape = Some(value.parse()?),
                "color" => overrides.color = Some(value.parse()?),
                _ => return Err(invalid_config(format!("unknown layer setting {:?}", key))),
            }
        }
        Ok(overrides)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::Args)]
pub struct RenderOptions {
    /// Supersampling factor: dots are drawn at this multiple of the source resolution and
    /// then downsampled. Memory grows with its square.
    #[clap(long, default_value = "3", global = true)]
    pub scale: u32,

    /// Seed for the random source. Omit for a different image on every run.
    #[clap(long, global = true)]
    pub seed: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            scale: 3,
            seed: None,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<()> {
        if self.scale == 0 {
            return Err(invalid_config("scale must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn base() -> DotLayerConfig {
        DotLayerConfig {
            radius: 1.8,
            density: 10,
            jitter: 0.65,
            ratio: 0.55,
            shape: Shape::Circle,
            color: Rgb::new(255, 0, 0),
        }
    }

    #[test]
    fn test_validate_accepts_edges() {
        assert!(base().validate().is_ok());
        let edges = DotLayerConfig {
            radius: 0.0,
            density: 1,
            jitter: 0.0,
            ratio: 1.0,
            ..base()
        };
        assert!(edges.validate().is_ok());
        assert!(DotLayerConfig { ratio: 0.0, ..base() }.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let bad = [
            DotLayerConfig { density: 0, ..base() },
            DotLayerConfig { radius: -0.1, ..base() },
            DotLayerConfig { radius: f64::NAN, ..base() },
            DotLayerConfig { radius: f64::INFINITY, ..base() },
            DotLayerConfig { jitter: -1.0, ..base() },
            DotLayerConfig { ratio: 1.01, ..base() },
            DotLayerConfig { ratio: -0.5, ..base() },
            DotLayerConfig { ratio: f64::NAN, ..base() },
        ];
        for config in bad {
            match config.validate() {
                Err(Error::InvalidConfig(_)) => {}
                other => panic!("{:?}: expected InvalidConfig, got {:?}", config, other),
            }
        }
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!("circle".parse::<Shape>().unwrap(), Shape::Circle);
        assert_eq!("square".parse::<Shape>().unwrap(), Shape::RoundedSquare);
        assert_eq!("rounded-square".parse::<Shape>().unwrap(), Shape::RoundedSquare);
        assert!(matches!(
            "triangle".parse::<Shape>(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserialize_layer() {
        let config: DotLayerConfig = serde_json::from_str(
            r##"{"radius": 1.5, "density": 7, "jitter": 0.25, "ratio": 0.75,
                 "shape": "square", "color": "#00c800"}"##,
        )
        .unwrap();
        assert_eq!(config.shape, Shape::RoundedSquare);
        assert_eq!(config.color, Rgb::new(0, 200, 0));
        assert_eq!(config.density, 7);

        let unknown_shape = r##"{"radius": 1.5, "density": 7, "jitter": 0.25, "ratio": 0.75,
                                "shape": "star", "color": "#00c800"}"##;
        assert!(serde_json::from_str::<DotLayerConfig>(unknown_shape).is_err());
    }

    #[test]
    fn test_overrides() {
        let overrides: LayerOverrides = "radius=2.5, shape=square,color=#0000ff".parse().unwrap();
        assert_eq!(
            overrides,
            LayerOverrides {
                radius: Some(2.5),
                shape: Some(Shape::RoundedSquare),
                color: Some(Rgb::new(0, 0, 255)),
                ..Default::default()
            }
        );
        let config = base().with_overrides(&overrides);
        assert_eq!(config.radius, 2.5);
        assert_eq!(config.density, 10);
        assert_eq!(config.shape, Shape::RoundedSquare);
        assert_eq!(config.color, Rgb::new(0, 0, 255));

        assert_eq!("".parse::<LayerOverrides>().unwrap(), LayerOverrides::default());
    }

    #[test]
    fn test_overrides_errors() {
        assert!(matches!(
            "radius".parse::<LayerOverrides>(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            "size=3".parse::<LayerOverrides>(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            "density=-3".parse::<LayerOverrides>(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            "color=#zzzzzz".parse::<LayerOverrides>(),
            Err(Error::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_render_options() {
        assert!(RenderOptions::default().validate().is_ok());
        let zero = RenderOptions {
            scale: 0,
            seed: None,
        };
        assert!(zero.validate().is_err());
    }
}

//! Chromostereopsis stimulus synthesis.
//!
//! Finds the pixels of a source image that match one or more target colors and redraws
//! each matching region as randomly placed, randomly sized dots on a black canvas. Layers
//! are drawn in order onto one supersampled canvas, which is then downsampled to the
//! source resolution.
//!
//! ```no_run
//! use chromostereo::{preset::PresetDb, render, RenderOptions};
//!
//! let db = PresetDb::from_bundle();
//! let layers = db.preset("red-green").unwrap();
//! let options = RenderOptions { scale: 3, seed: Some(7) };
//! render::generate_file("in.png".as_ref(), "out.png".as_ref(), layers, &options, |_| {})?;
//! # Ok::<(), chromostereo::Error>(())
//! ```

pub mod canvas;
pub mod color;
pub mod config;
pub mod distance;
pub mod dot;
pub mod error;
pub mod mask;
pub mod preset;
pub mod progress;
pub mod rand;
pub mod render;
pub mod sampler;

pub use color::Rgb;
pub use config::{DotLayerConfig, LayerOverrides, RenderOptions, Shape};
pub use error::{Error, Result};
pub use mask::{ColorMask, MaskRule};
pub use render::{generate, generate_file, Layer, Render};

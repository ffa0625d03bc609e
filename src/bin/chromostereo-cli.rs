use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chromostereo::mask::DEFAULT_TOLERANCE;
use chromostereo::preset::PresetDb;
use chromostereo::{Layer, LayerOverrides, RenderOptions, Rgb};

#[derive(Parser)]
#[clap(about = "Chromostereopsis stimulus generator")]
struct Opts {
    #[clap(subcommand)]
    mode: Mode,
    /// Source image.
    #[clap(long, global = true)]
    input: Option<PathBuf>,
    /// Destination image; the format follows the extension. Defaults to `<mode>.png`.
    #[clap(long, global = true)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    render: RenderOptions,
}

#[derive(Subcommand)]
enum Mode {
    /// Red dots in front of blue dots.
    RedBlue(PresetArgs),
    /// Red dots in front of green dots.
    RedGreen(PresetArgs),
    /// Red dots in front of grey dots.
    RedGrey(PresetArgs),
    /// Two arbitrary target colors, matched within a shared tolerance.
    Custom(CustomArgs),
}

#[derive(clap::Args)]
struct PresetArgs {
    /// Overrides for the back layer, e.g. `radius=2,density=5,shape=circle`.
    #[clap(long, default_value = "")]
    back: LayerOverrides,
    /// Overrides for the front (red) layer.
    #[clap(long, default_value = "")]
    front: LayerOverrides,
}

#[derive(clap::Args)]
struct CustomArgs {
    /// First target color, `#rrggbb`. Drawn first.
    #[clap(long)]
    color1: Rgb,
    /// Second target color, `#rrggbb`. Drawn on top.
    #[clap(long)]
    color2: Rgb,
    /// Largest RGB distance from a target color that still counts as a match.
    #[clap(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,
    #[clap(long, default_value = "")]
    layer1: LayerOverrides,
    #[clap(long, default_value = "")]
    layer2: LayerOverrides,
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::RedBlue(_) => "red-blue",
            Mode::RedGreen(_) => "red-green",
            Mode::RedGrey(_) => "red-grey",
            Mode::Custom(_) => "custom",
        }
    }

    fn layers(&self, db: &PresetDb) -> anyhow::Result<Vec<Layer>> {
        let (mut layers, overrides) = match self {
            Mode::RedBlue(args) | Mode::RedGreen(args) | Mode::RedGrey(args) => {
                let layers = db
                    .preset(self.name())
                    .ok_or_else(|| anyhow!("no bundled preset named {}", self.name()))?
                    .to_vec();
                (layers, [args.back, args.front])
            }
            Mode::Custom(args) => (
                db.two_color(args.color1, args.color2, args.tolerance),
                [args.layer1, args.layer2],
            ),
        };
        for (layer, overrides) in layers.iter_mut().zip(overrides.iter()) {
            layer.dots = layer.dots.with_overrides(overrides);
        }
        Ok(layers)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let opts = Opts::parse();
    let input = opts
        .input
        .clone()
        .context("--input is required: pass the path of the source image")?;
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.png", opts.mode.name())));

    let db = PresetDb::from_bundle();
    let layers = opts.mode.layers(&db)?;

    chromostereo::generate_file(&input, &output, &layers, &opts.render, |_| {}).with_context(
        || {
            format!(
                "failed to render {} into {}",
                input.display(),
                output.display()
            )
        },
    )?;
    Ok(())
}

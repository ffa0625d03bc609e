use std::path::Path;

use image::RgbImage;

use crate::canvas::Canvas;
use crate::config::{DotLayerConfig, RenderOptions};
use crate::distance::DistanceField;
use crate::dot::{DotRenderer, Placement};
use crate::error::{invalid_config, Result};
use crate::mask::{ColorMask, MaskRule};
use crate::progress::ProgressTracker;
use crate::rand::Rng;
use crate::sampler::{CellGrid, CellSampler, Sample};

/// One color region of the source and the dots it turns into.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub rule: MaskRule,
    pub dots: DotLayerConfig,
}

/// What happened to the cells of one layer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LayerStats {
    pub cells: u64,
    pub occupied: u64,
    pub out_of_bounds: u64,
    pub too_close_to_edge: u64,
    pub too_small: u64,
    pub drawn: u64,
}

pub struct Render {
    /// The final image, at source resolution.
    pub image: RgbImage,
    /// Per-layer statistics, in draw order.
    pub layers: Vec<LayerStats>,
}

/// Everything derived from the source for one layer before drawing starts.
struct PreparedLayer<'a> {
    mask: ColorMask,
    field: DistanceField,
    grid: CellGrid,
    dots: &'a DotLayerConfig,
}

/// Redraws the regions of `source` matched by each layer's rule as a field of dots on
/// black, drawing layers in order so that later layers cover earlier ones.
///
/// `on_progress` receives each 5% milestone once, ending with 100.
pub fn generate(
    source: &RgbImage,
    layers: &[Layer],
    options: &RenderOptions,
    rng: &mut Rng,
    mut on_progress: impl FnMut(u32),
) -> Result<Render> {
    options.validate()?;
    if layers.is_empty() {
        return Err(invalid_config("at least one layer is required"));
    }
    for layer in layers {
        layer.rule.validate()?;
        layer.dots.validate()?;
    }

    let (width, height) = source.dimensions();
    let prepared = layers
        .iter()
        .map(|layer| {
            let mask = ColorMask::build(source, &layer.rule);
            let field = DistanceField::from_mask(&mask);
            let grid = CellGrid::new(width, height, layer.dots.density)?;
            Ok(PreparedLayer {
                mask,
                field,
                grid,
                dots: &layer.dots,
            })
        })
        .collect::<Result<Vec<PreparedLayer>>>()?;

    let mut canvas = Canvas::new(width, height, options.scale)?;
    let mut progress = ProgressTracker::new(prepared.iter().map(|l| l.grid.len()).sum());
    let mut report = |percent: u32| {
        tracing::info!(percent, "Rendering");
        on_progress(percent);
    };

    let mut stats = Vec::with_capacity(prepared.len());
    for (i, layer) in prepared.iter().enumerate() {
        let layer_stats = render_layer(layer, &mut canvas, rng, &mut progress, &mut report);
        tracing::debug!(
            layer = i,
            color = %layer.dots.color,
            masked = layer.mask.count(),
            cells = layer_stats.cells,
            occupied = layer_stats.occupied,
            drawn = layer_stats.drawn,
            out_of_bounds = layer_stats.out_of_bounds,
            too_close_to_edge = layer_stats.too_close_to_edge,
            too_small = layer_stats.too_small,
            "Layer rendered"
        );
        stats.push(layer_stats);
    }
    if let Some(percent) = progress.finish() {
        report(percent);
    }

    Ok(Render {
        image: canvas.downsample(),
        layers: stats,
    })
}

fn render_layer(
    layer: &PreparedLayer,
    canvas: &mut Canvas,
    rng: &mut Rng,
    progress: &mut ProgressTracker,
    report: &mut impl FnMut(u32),
) -> LayerStats {
    let mut stats = LayerStats::default();
    let mut sampler = CellSampler::new(&layer.mask, layer.dots.jitter, canvas.scale());
    let renderer = DotRenderer::new(&layer.field, layer.dots, canvas.scale());

    for cell in layer.grid.cells() {
        stats.cells += 1;
        progress.advance().for_each(&mut *report);

        let candidate = match sampler.sample(cell, rng) {
            Sample::Empty => continue,
            Sample::OutOfBounds => {
                stats.occupied += 1;
                stats.out_of_bounds += 1;
                continue;
            }
            Sample::Candidate(candidate) => {
                stats.occupied += 1;
                candidate
            }
        };
        match renderer.place(&candidate, rng) {
            Placement::Draw(dot) => {
                canvas.draw(&dot);
                stats.drawn += 1;
            }
            Placement::TooCloseToEdge => stats.too_close_to_edge += 1,
            Placement::TooSmall => stats.too_small += 1,
        }
    }
    stats
}

/// Loads `input`, renders it, and writes the result to `output` in the format implied by
/// its extension. Nothing is written unless rendering succeeds.
pub fn generate_file(
    input: &Path,
    output: &Path,
    layers: &[Layer],
    options: &RenderOptions,
    on_progress: impl FnMut(u32),
) -> Result<Render> {
    let source = image::open(input)?.into_rgb8();
    let mut rng = Rng::new(options.seed);
    let render = generate(&source, layers, options, &mut rng, on_progress)?;
    render.image.save(output)?;
    tracing::info!(path = %output.display(), "Saved image");
    Ok(render)
}

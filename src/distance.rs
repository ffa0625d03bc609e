//! Exact Euclidean distance transform of a [`ColorMask`].
//!
//! Uses the separable lower-envelope-of-parabolas algorithm (Felzenszwalb & Huttenlocher,
//! "Distance Transforms of Sampled Functions", 2012): one pass down every column computes
//! squared vertical distances, a second pass along every row folds in the horizontal
//! component. Both passes are linear, so the whole transform is O(width * height).

use crate::mask::ColorMask;

/// Per-pixel Euclidean distance to the nearest pixel outside the mask.
///
/// Pixels outside the mask have distance `0.0`. If the mask has no outside pixels at all,
/// every distance is `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl DistanceField {
    pub fn from_mask(mask: &ColorMask) -> Self {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let mut squared: Vec<f64> = mask
            .as_slice()
            .iter()
            .map(|&inside| if inside { f64::INFINITY } else { 0.0 })
            .collect();

        let mut envelope = Envelope::with_capacity(width.max(height));
        let mut line = vec![0.0; width.max(height)];
        let mut out = vec![0.0; width.max(height)];

        for x in 0..width {
            for y in 0..height {
                line[y] = squared[y * width + x];
            }
            envelope.transform(&line[..height], &mut out[..height]);
            for y in 0..height {
                squared[y * width + x] = out[y];
            }
        }

        for row in squared.chunks_exact_mut(width.max(1)) {
            line[..width].copy_from_slice(row);
            envelope.transform(&line[..width], row);
        }

        let values = squared.into_iter().map(f64::sqrt).collect();
        DistanceField {
            width: mask.width(),
            height: mask.height(),
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f64 {
        assert!(x < self.width && y < self.height, "({}, {}) out of bounds", x, y);
        self.values[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Scratch space for the 1-D transform, reused across rows and columns.
struct Envelope {
    /// Sample positions of the parabolas in the lower envelope.
    vertices: Vec<usize>,
    /// `bounds[i]` is where parabola `i` starts to be the lowest.
    bounds: Vec<f64>,
}

impl Envelope {
    fn with_capacity(n: usize) -> Self {
        Envelope {
            vertices: Vec::with_capacity(n),
            bounds: Vec::with_capacity(n),
        }
    }

    /// Computes `out[q] = min_p ((q - p)^2 + f[p])`. Infinite samples contribute no
    /// parabola; if every sample is infinite, so is every output.
    fn transform(&mut self, f: &[f64], out: &mut [f64]) {
        self.vertices.clear();
        self.bounds.clear();

        let parabola = |p: usize| f[p] + (p * p) as f64;

        for q in (0..f.len()).filter(|&q| f[q].is_finite()) {
            loop {
                let Some(&p) = self.vertices.last() else {
                    self.vertices.push(q);
                    self.bounds.push(f64::NEG_INFINITY);
                    break;
                };
                let s = (parabola(q) - parabola(p)) / (2 * (q - p)) as f64;
                if self.bounds.last().is_some_and(|&b| s <= b) {
                    self.vertices.pop();
                    self.bounds.pop();
                } else {
                    self.vertices.push(q);
                    self.bounds.push(s);
                    break;
                }
            }
        }

        if self.vertices.is_empty() {
            out.fill(f64::INFINITY);
            return;
        }

        let mut k = 0;
        for (q, slot) in out.iter_mut().enumerate() {
            while k + 1 < self.vertices.len() && self.bounds[k + 1] < q as f64 {
                k += 1;
            }
            let p = self.vertices[k];
            let d = q.abs_diff(p) as f64;
            *slot = d * d + f[p];
        }
    }
}

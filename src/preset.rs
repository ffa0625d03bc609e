use std::collections::{hash_map::Entry::*, HashMap};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::DotLayerConfig;
use crate::mask::MaskRule;
use crate::render::Layer;

const PRESETS_JSON: &str = include_str!("presets.json");

#[derive(Debug, Deserialize, Serialize)]
pub struct WireClassifier {
    name: String,
    #[serde(flatten)]
    rule: MaskRule,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WireLayer {
    classifier: String,
    dots: DotLayerConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WirePreset {
    name: String,
    layers: Vec<WireLayer>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WirePresetDb {
    classifiers: Vec<WireClassifier>,
    presets: Vec<WirePreset>,
}

#[derive(Debug, PartialEq)]
pub enum PresetFormatError {
    DuplicateClassifier { name: String },
    DuplicatePreset { name: String },
    UndefinedClassifier { name: String, preset: String },
    NoLayers { preset: String },
    InvalidLayer { preset: String, message: String },
}

/// Named layer stacks, in draw order.
#[derive(Debug)]
pub struct PresetDb {
    classifiers: HashMap<String, MaskRule>,
    presets: HashMap<String, Vec<Layer>>,
    names: Vec<String>,
}

impl PresetDb {
    pub fn from_bundle() -> Self {
        let wire: WirePresetDb =
            serde_json::from_str(PRESETS_JSON).expect("bundled presets are invalid JSON");
        PresetDb::from_wire(wire).expect("bundled presets are not a valid database")
    }

    pub fn from_wire(wire: WirePresetDb) -> Result<Self, PresetFormatError> {
        let mut db = PresetDb {
            classifiers: HashMap::with_capacity(wire.classifiers.len()),
            presets: HashMap::with_capacity(wire.presets.len()),
            names: Vec::with_capacity(wire.presets.len()),
        };

        for WireClassifier { name, rule } in wire.classifiers {
            match db.classifiers.entry(name) {
                Occupied(o) => {
                    let name = o.remove_entry().0;
                    return Err(PresetFormatError::DuplicateClassifier { name });
                }
                Vacant(v) => v.insert(rule),
            };
        }

        for preset in wire.presets {
            let entry = match db.presets.entry(preset.name) {
                Occupied(o) => {
                    let name = o.remove_entry().0;
                    return Err(PresetFormatError::DuplicatePreset { name });
                }
                Vacant(v) => v,
            };
            if preset.layers.is_empty() {
                return Err(PresetFormatError::NoLayers {
                    preset: entry.key().clone(),
                });
            }
            let layers = preset
                .layers
                .into_iter()
                .map(|WireLayer { classifier, dots }| {
                    let rule = db.classifiers.get(&classifier).cloned().ok_or_else(|| {
                        PresetFormatError::UndefinedClassifier {
                            name: classifier,
                            preset: entry.key().clone(),
                        }
                    })?;
                    dots.validate()
                        .map_err(|e| PresetFormatError::InvalidLayer {
                            preset: entry.key().clone(),
                            message: e.to_string(),
                        })?;
                    Ok(Layer { rule, dots })
                })
                .collect::<Result<Vec<Layer>, PresetFormatError>>()?;
            db.names.push(entry.key().clone());
            entry.insert(layers);
        }

        Ok(db)
    }

    /// Preset names in bundle order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn preset(&self, name: &str) -> Option<&[Layer]> {
        self.presets.get(name).map(Vec::as_slice)
    }

    pub fn classifier(&self, name: &str) -> Option<&MaskRule> {
        self.classifiers.get(name)
    }

    /// Two target-color layers sharing one tolerance, drawn in argument order. The first
    /// takes its dot settings from the red layer of `red-blue`, the second from the blue one.
    pub fn two_color(&self, first: Rgb, second: Rgb, tolerance: f64) -> Vec<Layer> {
        let defaults = self.preset("red-blue").unwrap_or_default();
        let dots = |i: usize, color: Rgb| {
            let base = defaults.get(i).map_or(FALLBACK_DOTS, |l| l.dots);
            DotLayerConfig { color, ..base }
        };
        vec![
            Layer {
                rule: MaskRule::near(first, tolerance),
                dots: dots(1, first),
            },
            Layer {
                rule: MaskRule::near(second, tolerance),
                dots: dots(0, second),
            },
        ]
    }
}

const FALLBACK_DOTS: DotLayerConfig = DotLayerConfig {
    radius: 1.5,
    density: 7,
    jitter: 0.25,
    ratio: 0.75,
    shape: crate::config::Shape::RoundedSquare,
    color: Rgb::BLACK,
};

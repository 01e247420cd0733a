//! Optimization weights sent to the route service, and the two seasonal presets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute tolerance used when comparing weights against a preset
pub const PRESET_TOLERANCE: f64 = 1e-9;

/// Inclusive bounds accepted for any single weight
pub const WEIGHT_MIN: f64 = 0.0;
pub const WEIGHT_MAX: f64 = 4.0;

/// Difference weight applied with the high-season preset while recalculating
pub const RECALCULATION_DIFFERENCE: f64 = 4.0;

/// Six-coefficient tuning input for the route service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    #[serde(rename = "inventario")]
    pub inventory: f64,
    #[serde(rename = "tiempo")]
    pub time: f64,
    #[serde(rename = "costo")]
    pub cost: f64,
    #[serde(rename = "nodo")]
    pub node: f64,
    #[serde(rename = "ruta")]
    pub route: f64,
    #[serde(rename = "diferencia")]
    pub difference: f64,
}

impl WeightVector {
    pub const LOW_SEASON: WeightVector = WeightVector {
        inventory: 0.5,
        time: 1.0,
        cost: 2.0,
        node: 0.5,
        route: 0.5,
        difference: 0.0,
    };

    pub const HIGH_SEASON: WeightVector = WeightVector {
        inventory: 0.4,
        time: 2.0,
        cost: 0.1,
        node: 0.5,
        route: 0.5,
        difference: 0.0,
    };

    fn values(&self) -> [f64; 6] {
        [
            self.inventory,
            self.time,
            self.cost,
            self.node,
            self.route,
            self.difference,
        ]
    }

    /// True when every coefficient is within `PRESET_TOLERANCE` of `other`.
    pub fn approx_eq(&self, other: &WeightVector) -> bool {
        self.values()
            .iter()
            .zip(other.values().iter())
            .all(|(a, b)| (a - b).abs() < PRESET_TOLERANCE)
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::LOW_SEASON
    }
}

/// Named weight preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    LowSeason,
    HighSeason,
}

impl Preset {
    pub fn slug(&self) -> &'static str {
        match self {
            Preset::LowSeason => "low-season",
            Preset::HighSeason => "high-season",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Preset> {
        match slug {
            "low-season" => Some(Preset::LowSeason),
            "high-season" => Some(Preset::HighSeason),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Preset::LowSeason => "Low season",
            Preset::HighSeason => "High season",
        }
    }

    /// Weights of this preset. The high-season difference weight depends on
    /// whether recalculation is active.
    pub fn weights(&self, recalculation: bool) -> WeightVector {
        match self {
            Preset::LowSeason => WeightVector::LOW_SEASON,
            Preset::HighSeason => WeightVector {
                difference: if recalculation { RECALCULATION_DIFFERENCE } else { 0.0 },
                ..WeightVector::HIGH_SEASON
            },
        }
    }
}

/// Result of comparing the current weights against the presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetStatus {
    Active(Preset),
    Custom,
}

impl fmt::Display for PresetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetStatus::Active(p) => write!(f, "{}", p.display_name()),
            PresetStatus::Custom => write!(f, "Custom"),
        }
    }
}

/// Detect which preset, if any, the given weights correspond to.
pub fn detect_preset(weights: &WeightVector, recalculation: bool) -> PresetStatus {
    [Preset::LowSeason, Preset::HighSeason]
        .into_iter()
        .find(|p| weights.approx_eq(&p.weights(recalculation)))
        .map(PresetStatus::Active)
        .unwrap_or(PresetStatus::Custom)
}

/// Weights in effect after recalculation mode is switched on or off.
pub fn weights_for_recalculation_toggle(enabled: bool) -> WeightVector {
    if enabled {
        Preset::HighSeason.weights(true)
    } else {
        Preset::LowSeason.weights(false)
    }
}

/// Apply a slider edit. Only the coefficients editable in the current mode
/// are taken from `edited`: while recalculating the five base weights stay
/// pinned to high season, otherwise the difference weight stays at zero.
pub fn apply_edit(edited: &WeightVector, recalculation: bool) -> WeightVector {
    if recalculation {
        WeightVector {
            difference: edited.difference,
            ..WeightVector::HIGH_SEASON
        }
    } else {
        WeightVector {
            difference: 0.0,
            ..*edited
        }
    }
}

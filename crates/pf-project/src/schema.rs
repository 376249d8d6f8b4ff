//! Project schema definitions.

use crate::units::{EfficiencyUnit, FlowUnit, HeadUnit, PowerUnit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub pumps: Vec<PumpDef>,
    #[serde(default)]
    pub system_curves: Vec<SystemCurveDef>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDef>,
}

/// Catalog pump: rated-speed samples in the declared units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PumpDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_speed_rpm: Option<f64>,
    #[serde(default)]
    pub units: PumpUnitsDef,
    pub points: Vec<CurvePointDef>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PumpUnitsDef {
    #[serde(default)]
    pub flow: FlowUnit,
    #[serde(default)]
    pub head: HeadUnit,
    #[serde(default)]
    pub efficiency: EfficiencyUnit,
    #[serde(default)]
    pub power: PowerUnit,
    #[serde(default)]
    pub npshr: HeadUnit,
}

/// Units of a system curve's flows, heads, static head and domain.
/// The resistance coefficient and extra terms are always SI.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemUnitsDef {
    #[serde(default)]
    pub flow: FlowUnit,
    #[serde(default)]
    pub head: HeadUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurvePointDef {
    pub flow: f64,
    pub head: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npshr: Option<f64>,
}

/// Piping system curve. Non-empty `points` select the sampled form;
/// otherwise the parametric coefficients over `domain` are used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemCurveDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub units: SystemUnitsDef,
    #[serde(default)]
    pub static_head: f64,
    #[serde(default)]
    pub resistance_coefficient: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_terms: Vec<ExtraTermDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<SystemPointDef>,
}

impl SystemCurveDef {
    pub fn is_sampled(&self) -> bool {
        !self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExtraTermDef {
    pub coefficient: f64,
    pub exponent: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SystemPointDef {
    pub flow: f64,
    pub head: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub name: String,
    pub system_curve_id: String,
    #[serde(default = "default_por")]
    pub por_default: [f64; 2],
    #[serde(default = "default_aor")]
    pub aor_default: [f64; 2],
    #[serde(default)]
    pub pumps: Vec<ScenarioPumpDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioPumpDef {
    pub pump_id: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub arrangement: ArrangementDef,
    #[serde(default = "default_speeds")]
    pub vfd_speeds: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArrangementDef {
    #[default]
    Parallel,
    Series,
}

fn default_por() -> [f64; 2] {
    [pf_curves::DEFAULT_POR.low, pf_curves::DEFAULT_POR.high]
}

fn default_aor() -> [f64; 2] {
    [pf_curves::DEFAULT_AOR.low, pf_curves::DEFAULT_AOR.high]
}

fn default_count() -> u32 {
    1
}

fn default_speeds() -> Vec<f64> {
    vec![1.0]
}

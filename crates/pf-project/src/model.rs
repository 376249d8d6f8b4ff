//! Conversion of a validated project into solver inputs.

use crate::schema::{ArrangementDef, Project, PumpDef, ScenarioDef, SystemCurveDef};
use crate::{ProjectError, ProjectResult};
use pf_curves::{Arrangement, Band, CurveModel, CurveSamples, ExtraTerm, FlowDomain, SystemCurve};
use pf_solver::{PumpEntry, Scenario};
use std::collections::HashMap;

impl From<ArrangementDef> for Arrangement {
    fn from(def: ArrangementDef) -> Self {
        match def {
            ArrangementDef::Parallel => Arrangement::Parallel,
            ArrangementDef::Series => Arrangement::Series,
        }
    }
}

/// Rated-speed curve of `pump`, converted to SI.
pub fn build_pump_curve(pump: &PumpDef) -> ProjectResult<CurveModel> {
    let u = pump.units;
    let flow = pump.points.iter().map(|p| u.flow.to_si(p.flow)).collect();
    let head = pump.points.iter().map(|p| u.head.to_si(p.head)).collect();
    let mut samples = CurveSamples::new(flow, head);

    let efficiency: Option<Vec<f64>> = pump
        .points
        .iter()
        .map(|p| p.efficiency.map(|v| u.efficiency.to_si(v)))
        .collect();
    if let Some(efficiency) = efficiency {
        samples = samples.with_efficiency(efficiency);
    }
    let power: Option<Vec<f64>> = pump
        .points
        .iter()
        .map(|p| p.power.map(|v| u.power.to_si(v)))
        .collect();
    if let Some(power) = power {
        samples = samples.with_power(power);
    }
    let npshr: Option<Vec<f64>> = pump
        .points
        .iter()
        .map(|p| p.npshr.map(|v| u.npshr.to_si(v)))
        .collect();
    if let Some(npshr) = npshr {
        samples = samples.with_npshr(npshr);
    }

    let curve = CurveModel::new(samples)?;
    tracing::debug!(pump = %pump.id, samples = curve.len(), "pump curve built");
    Ok(curve)
}

/// System curve of `def`, converted to SI.
pub fn build_system_curve(def: &SystemCurveDef) -> ProjectResult<SystemCurve> {
    let u = def.units;
    if def.is_sampled() {
        let flow = def.points.iter().map(|p| u.flow.to_si(p.flow)).collect();
        let head = def.points.iter().map(|p| u.head.to_si(p.head)).collect();
        return Ok(SystemCurve::sampled(flow, head)?);
    }

    let [lo, hi] = def.domain.ok_or_else(|| {
        ProjectError::from(crate::ValidationError::InvalidValue {
            field: format!("system_curve '{}' domain", def.id),
            value: "none".to_string(),
            reason: "parametric curves need an explicit flow domain".to_string(),
        })
    })?;
    let domain = FlowDomain::new(u.flow.to_si(lo), u.flow.to_si(hi))?;
    let terms = def
        .extra_terms
        .iter()
        .map(|t| ExtraTerm {
            coefficient: t.coefficient,
            exponent: t.exponent,
        })
        .collect();
    Ok(SystemCurve::parametric(
        u.head.to_si(def.static_head),
        def.resistance_coefficient,
        terms,
        domain,
    )?)
}

/// Every curve of a project, built once and borrowed by scenarios.
#[derive(Debug)]
pub struct ProjectModel {
    pumps: HashMap<String, (String, CurveModel)>,
    systems: HashMap<String, SystemCurve>,
}

impl ProjectModel {
    pub fn from_project(project: &Project) -> ProjectResult<Self> {
        let mut pumps = HashMap::new();
        for pump in &project.pumps {
            pumps.insert(pump.id.clone(), (pump.name.clone(), build_pump_curve(pump)?));
        }
        let mut systems = HashMap::new();
        for system in &project.system_curves {
            systems.insert(system.id.clone(), build_system_curve(system)?);
        }
        Ok(Self { pumps, systems })
    }

    pub fn pump_curve(&self, id: &str) -> Option<&CurveModel> {
        self.pumps.get(id).map(|(_, curve)| curve)
    }

    pub fn system_curve(&self, id: &str) -> Option<&SystemCurve> {
        self.systems.get(id)
    }

    /// Solver scenario for `def`, borrowing this model's curves.
    pub fn scenario<'a>(&'a self, def: &ScenarioDef) -> ProjectResult<Scenario<'a>> {
        let system = self
            .systems
            .get(&def.system_curve_id)
            .ok_or_else(|| missing(&def.system_curve_id, &def.name, "system_curve_id"))?;

        let mut scenario = Scenario::new(def.name.clone(), system).with_ranges(
            Band::new(def.por_default[0], def.por_default[1]),
            Band::new(def.aor_default[0], def.aor_default[1]),
        );
        for entry in &def.pumps {
            let (name, curve) = self
                .pumps
                .get(&entry.pump_id)
                .ok_or_else(|| missing(&entry.pump_id, &def.name, "pump_id"))?;
            scenario = scenario.with_entry(
                PumpEntry::new(name.clone(), curve, entry.count, entry.arrangement.into())
                    .with_speeds(entry.vfd_speeds.clone()),
            );
        }
        Ok(scenario)
    }
}

fn missing(id: &str, scenario: &str, field: &str) -> ProjectError {
    crate::ValidationError::MissingReference {
        id: id.to_string(),
        context: format!("scenario '{}' {}", scenario, field),
    }
    .into()
}

//! Project validation logic.

use crate::schema::{CurvePointDef, Project, PumpDef, ScenarioDef, SystemCurveDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: String, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut pump_ids = HashSet::new();
    for pump in &project.pumps {
        if !pump_ids.insert(&pump.id) {
            return Err(ValidationError::DuplicateId {
                id: pump.id.clone(),
                context: "pumps".to_string(),
            });
        }
        validate_pump(pump)?;
    }

    let mut system_ids = HashSet::new();
    for system in &project.system_curves {
        if !system_ids.insert(&system.id) {
            return Err(ValidationError::DuplicateId {
                id: system.id.clone(),
                context: "system_curves".to_string(),
            });
        }
        validate_system_curve(system)?;
    }

    let mut scenario_names = HashSet::new();
    for scenario in &project.scenarios {
        if !scenario_names.insert(&scenario.name) {
            return Err(ValidationError::DuplicateId {
                id: scenario.name.clone(),
                context: "scenarios".to_string(),
            });
        }
        if !system_ids.contains(&scenario.system_curve_id) {
            return Err(ValidationError::MissingReference {
                id: scenario.system_curve_id.clone(),
                context: format!("scenario '{}' system_curve_id", scenario.name),
            });
        }
        for entry in &scenario.pumps {
            if !pump_ids.contains(&entry.pump_id) {
                return Err(ValidationError::MissingReference {
                    id: entry.pump_id.clone(),
                    context: format!("scenario '{}' pump_id", scenario.name),
                });
            }
        }
        validate_scenario(scenario)?;
    }

    Ok(())
}

fn validate_pump(pump: &PumpDef) -> Result<(), ValidationError> {
    if let Some(rpm) = pump.rated_speed_rpm {
        if !(rpm.is_finite() && rpm > 0.0) {
            return Err(invalid(
                format!("pump '{}' rated_speed_rpm", pump.id),
                rpm,
                "must be positive",
            ));
        }
    }
    if pump.points.len() < 2 {
        return Err(invalid(
            format!("pump '{}' points", pump.id),
            pump.points.len(),
            "at least two points are required",
        ));
    }

    let channels: [(&str, fn(&CurvePointDef) -> Option<f64>); 3] = [
        ("efficiency", |p| p.efficiency),
        ("power", |p| p.power),
        ("npshr", |p| p.npshr),
    ];
    for (name, get) in channels {
        let given = pump.points.iter().filter(|p| get(p).is_some()).count();
        if given != 0 && given != pump.points.len() {
            return Err(invalid(
                format!("pump '{}' {}", pump.id, name),
                format!("{}/{}", given, pump.points.len()),
                "must be given for every point or none",
            ));
        }
    }
    Ok(())
}

fn validate_system_curve(system: &SystemCurveDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("system_curve '{}' {}", system.id, name);

    if let Some([lo, hi]) = system.domain {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(invalid(
                field("domain"),
                format!("[{}, {}]", lo, hi),
                "must be finite with low < high",
            ));
        }
    }
    if system.is_sampled() {
        if system.points.len() < 2 {
            return Err(invalid(
                field("points"),
                system.points.len(),
                "at least two points are required",
            ));
        }
    } else if system.domain.is_none() {
        return Err(invalid(
            field("domain"),
            "none",
            "parametric curves need an explicit flow domain",
        ));
    }
    Ok(())
}

fn validate_scenario(scenario: &ScenarioDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("scenario '{}' {}", scenario.name, name);

    for (name, [low, high]) in [
        ("por_default", scenario.por_default),
        ("aor_default", scenario.aor_default),
    ] {
        if !(low.is_finite() && high.is_finite() && 0.0 < low && low <= high) {
            return Err(invalid(
                field(name),
                format!("[{}, {}]", low, high),
                "must satisfy 0 < low <= high",
            ));
        }
    }

    for entry in &scenario.pumps {
        if entry.count == 0 {
            return Err(invalid(
                field(&format!("pump '{}' count", entry.pump_id)),
                entry.count,
                "must be positive",
            ));
        }
        if let Some(bad) = entry
            .vfd_speeds
            .iter()
            .find(|s| !(s.is_finite() && **s > 0.0))
        {
            return Err(invalid(
                field(&format!("pump '{}' vfd_speeds", entry.pump_id)),
                bad,
                "speed ratios must be positive and finite",
            ));
        }
    }
    Ok(())
}

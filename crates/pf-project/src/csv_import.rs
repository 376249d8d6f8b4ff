//! Pump curve import from CSV tables.
//!
//! Expected layout:
//!
//! ```text
//! # units: flow gpm, head ft, efficiency %, power hp
//! flow,head,efficiency,power
//! 0,150,55,100
//! 500,140,70,120
//! ```
//!
//! The units comment is optional; without it flow is read in gpm and head in
//! feet, the other channels in their [`PumpUnitsDef`] defaults. The first
//! non-comment line is the header. Columns are matched by name, `flow` and
//! `head` are required, and unrecognised columns are ignored. Rows with a blank
//! or non-numeric cell in a recognised column are dropped. Quoted fields are
//! not supported.

use crate::schema::{CurvePointDef, PumpDef, PumpUnitsDef};
use crate::units::{FlowUnit, HeadUnit, UnknownUnit};
use crate::{ProjectError, ProjectResult};
use std::path::Path;

/// Curve points and units read from one CSV table.
#[derive(Debug, Clone, PartialEq)]
pub struct PumpCsv {
    pub units: PumpUnitsDef,
    pub points: Vec<CurvePointDef>,
}

impl PumpCsv {
    pub fn into_pump(self, id: &str, name: &str, rated_speed_rpm: Option<f64>) -> PumpDef {
        PumpDef {
            id: id.to_string(),
            name: name.to_string(),
            rated_speed_rpm,
            units: self.units,
            points: self.points,
        }
    }
}

#[derive(Default)]
struct Columns {
    flow: Option<usize>,
    head: Option<usize>,
    efficiency: Option<usize>,
    power: Option<usize>,
    npshr: Option<usize>,
}

fn csv_error(line: usize, what: impl Into<String>) -> ProjectError {
    ProjectError::Csv {
        line,
        what: what.into(),
    }
}

fn default_units() -> PumpUnitsDef {
    PumpUnitsDef {
        flow: FlowUnit::GallonPerMinute,
        head: HeadUnit::Foot,
        npshr: HeadUnit::Foot,
        ..PumpUnitsDef::default()
    }
}

fn parse_units(line_no: usize, body: &str) -> ProjectResult<PumpUnitsDef> {
    let mut units = default_units();
    let unit_err = |e: UnknownUnit| csv_error(line_no, e.to_string());
    for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let mut tokens = entry.split_whitespace();
        let (Some(quantity), Some(symbol), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(csv_error(line_no, format!("Malformed unit entry '{}'", entry)));
        };
        match quantity.to_ascii_lowercase().as_str() {
            "flow" => units.flow = symbol.parse().map_err(unit_err)?,
            "head" => units.head = symbol.parse().map_err(unit_err)?,
            "efficiency" => units.efficiency = symbol.parse().map_err(unit_err)?,
            "power" => units.power = symbol.parse().map_err(unit_err)?,
            "npshr" => units.npshr = symbol.parse().map_err(unit_err)?,
            other => {
                return Err(csv_error(line_no, format!("Unknown quantity '{}'", other)));
            }
        }
    }
    Ok(units)
}

fn parse_header(line_no: usize, line: &str) -> ProjectResult<Columns> {
    let mut columns = Columns::default();
    for (i, name) in line.split(',').enumerate() {
        let name = name.trim().to_ascii_lowercase();
        let slot = match name.as_str() {
            "flow" => &mut columns.flow,
            "head" => &mut columns.head,
            "efficiency" => &mut columns.efficiency,
            "power" => &mut columns.power,
            "npshr" => &mut columns.npshr,
            _ => {
                tracing::debug!(column = %name, "ignoring CSV column");
                continue;
            }
        };
        if slot.replace(i).is_some() {
            return Err(csv_error(line_no, format!("Duplicate column '{}'", name)));
        }
    }
    if columns.flow.is_none() || columns.head.is_none() {
        return Err(csv_error(line_no, "Header must name 'flow' and 'head' columns"));
    }
    Ok(columns)
}

/// `None` for a blank or non-numeric cell; `Some(None)` for an absent column.
fn cell(cells: &[&str], column: Option<usize>) -> Option<Option<f64>> {
    match column {
        None => Some(None),
        Some(i) => cells
            .get(i)
            .and_then(|c| c.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(Some),
    }
}

fn parse_row(cells: &[&str], columns: &Columns) -> Option<CurvePointDef> {
    Some(CurvePointDef {
        flow: cell(cells, columns.flow)??,
        head: cell(cells, columns.head)??,
        efficiency: cell(cells, columns.efficiency)?,
        power: cell(cells, columns.power)?,
        npshr: cell(cells, columns.npshr)?,
    })
}

/// Parse a pump curve table. Points come back sorted by flow.
pub fn parse_pump_csv(content: &str) -> ProjectResult<PumpCsv> {
    let mut units = None;
    let mut columns = None;
    let mut points = Vec::new();
    let mut dropped = 0usize;
    let mut last_line = 0;

    for (i, raw) in content.lines().enumerate() {
        let line_no = i + 1;
        last_line = line_no;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim();
            let lower = comment.to_ascii_lowercase();
            if let Some(body) = lower.strip_prefix("units") {
                let body = body.trim_start().trim_start_matches(':');
                let body = &comment[comment.len() - body.len()..];
                units = Some(parse_units(line_no, body)?);
            }
            continue;
        }
        match &columns {
            None => columns = Some(parse_header(line_no, line)?),
            Some(columns) => {
                let cells: Vec<&str> = line.split(',').collect();
                match parse_row(&cells, columns) {
                    Some(point) => points.push((line_no, point)),
                    None => dropped += 1,
                }
            }
        }
    }

    if columns.is_none() {
        return Err(csv_error(last_line, "CSV must include a header row"));
    }
    if dropped > 0 {
        tracing::warn!(dropped, "dropped CSV rows with missing or non-numeric values");
    }

    points.sort_by(|a, b| a.1.flow.total_cmp(&b.1.flow));
    if let Some(pair) = points.windows(2).find(|w| w[1].1.flow <= w[0].1.flow) {
        let (line, point) = &pair[1];
        return Err(csv_error(*line, format!("Repeated flow value {}", point.flow)));
    }

    Ok(PumpCsv {
        units: units.unwrap_or_else(default_units),
        points: points.into_iter().map(|(_, point)| point).collect(),
    })
}

pub fn read_pump_csv(path: &Path) -> ProjectResult<PumpCsv> {
    let content = std::fs::read_to_string(path)?;
    let table = parse_pump_csv(&content)?;
    tracing::debug!(path = %path.display(), points = table.points.len(), "pump CSV read");
    Ok(table)
}

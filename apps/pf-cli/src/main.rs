mod error;

use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use pf_curves::{
    Band, BepMethod, DEFAULT_AOR, DEFAULT_POR, DEFAULT_SAMPLE_POINTS, best_efficiency_point,
    operating_range, scale,
};
use pf_project::{Project, ProjectModel, PumpDef};
use pf_solver::{
    DEFAULT_INTERSECTION_SAMPLES, IntersectionConfig, ScenarioOptions, ScenarioReport,
    solve_scenario_report,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "PumpFlow CLI - pump and system curve operating point solver", long_about = None)]
struct Cli {
    /// Log solver progress (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file and build every curve in it
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Solve operating points for one or all scenarios
    Solve {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Scenario name (all scenarios when omitted)
        #[arg(short, long)]
        scenario: Option<String>,
        /// Write the report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Solve combinations on the current thread
        #[arg(long)]
        serial: bool,
        /// Grid size of the intersection scan
        #[arg(long, default_value_t = DEFAULT_INTERSECTION_SAMPLES)]
        grid: usize,
    },
    /// Show the best efficiency point and operating ranges of a pump
    Bep {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Pump ID
        pump_id: String,
        /// Preferred range as fractions of BEP flow
        #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
        por: Option<Vec<f64>>,
        /// Allowable range as fractions of BEP flow
        #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
        aor: Option<Vec<f64>>,
    },
    /// Import a pump curve from a CSV table
    ImportCsv {
        /// Path to the CSV file
        csv_path: PathBuf,
        /// Pump ID
        #[arg(long)]
        id: String,
        /// Display name (defaults to the ID)
        #[arg(long)]
        name: Option<String>,
        /// Rated speed in rpm
        #[arg(long)]
        rated_speed: Option<f64>,
        /// Append the pump to this project file instead of printing it
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Print a densely sampled pump curve as CSV in the pump's units
    Sample {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Pump ID
        pump_id: String,
        /// Number of samples
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_POINTS)]
        points: usize,
        /// Speed ratio relative to rated speed
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Solve {
            project_path,
            scenario,
            output,
            serial,
            grid,
        } => cmd_solve(
            &project_path,
            scenario.as_deref(),
            output.as_deref(),
            ScenarioOptions {
                parallel: !serial,
                intersection: IntersectionConfig {
                    samples: grid,
                    ..IntersectionConfig::default()
                },
            },
        ),
        Commands::Bep {
            project_path,
            pump_id,
            por,
            aor,
        } => cmd_bep(
            &project_path,
            &pump_id,
            band_or(por.as_deref(), DEFAULT_POR),
            band_or(aor.as_deref(), DEFAULT_AOR),
        ),
        Commands::Sample {
            project_path,
            pump_id,
            points,
            speed,
        } => cmd_sample(&project_path, &pump_id, points, speed),
        Commands::ImportCsv {
            csv_path,
            id,
            name,
            rated_speed,
            project,
        } => cmd_import_csv(
            &csv_path,
            &id,
            name.as_deref().unwrap_or(&id),
            rated_speed,
            project.as_deref(),
        ),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn band_or(values: Option<&[f64]>, default: Band) -> Band {
    match values {
        Some([low, high]) => Band::new(*low, *high),
        _ => default,
    }
}

fn find_pump<'a>(project: &'a Project, pump_id: &str) -> CliResult<&'a PumpDef> {
    project
        .pumps
        .iter()
        .find(|p| p.id == pump_id)
        .ok_or_else(|| CliError::NotFound {
            what: "Pump",
            id: pump_id.to_string(),
        })
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = pf_project::load(project_path)?;
    ProjectModel::from_project(&project)?;
    tracing::info!(project = %project.name, "project validated");
    println!("✓ Project is valid");
    println!(
        "  {} pumps, {} system curves, {} scenarios",
        project.pumps.len(),
        project.system_curves.len(),
        project.scenarios.len()
    );
    Ok(())
}

#[derive(Serialize)]
struct SolveOutput<'a> {
    project: &'a str,
    computed_at: String,
    scenarios: &'a [ScenarioReport],
}

fn cmd_solve(
    project_path: &Path,
    scenario_name: Option<&str>,
    output: Option<&Path>,
    options: ScenarioOptions,
) -> CliResult<()> {
    let project = pf_project::load(project_path)?;
    let model = ProjectModel::from_project(&project)?;

    let selected: Vec<_> = project
        .scenarios
        .iter()
        .filter(|s| scenario_name.is_none_or(|name| s.name == name))
        .collect();
    if let Some(name) = scenario_name {
        if selected.is_empty() {
            return Err(CliError::NotFound {
                what: "Scenario",
                id: name.to_string(),
            });
        }
    }

    tracing::info!(
        project = %project.name,
        scenarios = selected.len(),
        parallel = options.parallel,
        "solving"
    );
    let mut reports = Vec::with_capacity(selected.len());
    for def in selected {
        let scenario = model.scenario(def)?;
        let report = solve_scenario_report(&scenario, &options)?;
        tracing::info!(
            scenario = %report.scenario,
            solved = report.operating_points.len(),
            skipped = report.skipped.len(),
            "scenario solved"
        );
        print_report(&report);
        reports.push(report);
    }

    if let Some(path) = output {
        let payload = SolveOutput {
            project: &project.name,
            computed_at: chrono::Utc::now().to_rfc3339(),
            scenarios: &reports,
        };
        let content = serde_json::to_string_pretty(&payload)?;
        std::fs::write(path, content).map_err(|source| CliError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), scenarios = reports.len(), "report written");
        println!("✓ Report written to {}", path.display());
    }
    Ok(())
}

fn print_report(report: &ScenarioReport) {
    println!("Scenario: {}", report.scenario);
    if report.operating_points.is_empty() {
        println!("  No operating points");
    } else {
        println!(
            "  {:<28} {:>6} {:>12} {:>10} {:>7} {:>11}  {}",
            "configuration", "speed", "flow [m3/s]", "head [m]", "eff", "power [kW]", "zone"
        );
        for p in &report.operating_points {
            let eff = p
                .point
                .efficiency
                .map_or_else(|| "-".to_string(), |e| format!("{:.3}", e));
            let power = p
                .point
                .power
                .map_or_else(|| "-".to_string(), |w| format!("{:.2}", w / 1000.0));
            let zone = p
                .zone
                .map_or_else(|| "-".to_string(), |z| format!("{:?}", z).to_lowercase());
            println!(
                "  {:<28} {:>6.2} {:>12.5} {:>10.3} {:>7} {:>11}  {}",
                p.point.configuration, p.point.speed_ratio, p.point.flow, p.point.head, eff, power,
                zone
            );
        }
    }
    for s in &report.skipped {
        println!(
            "  skipped: {} @ {:.2} (no intersection)",
            s.configuration, s.speed_ratio
        );
    }
}

fn cmd_bep(project_path: &Path, pump_id: &str, por: Band, aor: Band) -> CliResult<()> {
    let project = pf_project::load(project_path)?;
    let pump = find_pump(&project, pump_id)?;
    let curve = pf_project::build_pump_curve(pump)?;

    let bep = best_efficiency_point(&curve);
    let method = match bep.method {
        BepMethod::MaxEfficiency => "maximum efficiency",
        BepMethod::MinSpecificEnergy => "minimum head/flow",
    };
    println!("{} ({})", pump.name, pump.id);
    println!("  BEP by {}: sample {}", method, bep.index);
    println!("  flow = {:.5} m3/s, head = {:.3} m", bep.flow, bep.head);
    if let Some(eff) = bep.efficiency {
        println!("  efficiency = {:.3}", eff);
    }

    let range = operating_range(bep.flow, por, aor)?;
    println!("  POR: {:.5} .. {:.5} m3/s", range.por.low, range.por.high);
    println!("  AOR: {:.5} .. {:.5} m3/s", range.aor.low, range.aor.high);
    Ok(())
}

fn cmd_sample(project_path: &Path, pump_id: &str, points: usize, speed: f64) -> CliResult<()> {
    let project = pf_project::load(project_path)?;
    let pump = find_pump(&project, pump_id)?;
    let curve = pf_project::build_pump_curve(pump)?;
    let sampling = scale(&curve, speed)?.sample(points)?;
    let units = pump.units;

    println!("flow,head,efficiency,power_w");
    for (i, (&q, &h)) in sampling.flow.iter().zip(&sampling.head).enumerate() {
        let eff = sampling
            .efficiency
            .as_ref()
            .map_or_else(String::new, |e| format!("{:.4}", e[i]));
        let power = sampling
            .power
            .as_ref()
            .map_or_else(String::new, |p| format!("{:.1}", p[i]));
        println!(
            "{:.6},{:.4},{},{}",
            units.flow.from_si(q),
            units.head.from_si(h),
            eff,
            power
        );
    }
    Ok(())
}

fn cmd_import_csv(
    csv_path: &Path,
    id: &str,
    name: &str,
    rated_speed: Option<f64>,
    project_path: Option<&Path>,
) -> CliResult<()> {
    let pump = pf_project::read_pump_csv(csv_path)?.into_pump(id, name, rated_speed);
    pf_project::build_pump_curve(&pump)?;

    let Some(project_path) = project_path else {
        print!("{}", serde_yaml::to_string(&pump)?);
        return Ok(());
    };
    let mut project = pf_project::load(project_path)?;
    let points = pump.points.len();
    project.pumps.push(pump);
    pf_project::save(project_path, &project)?;
    tracing::info!(pump = id, points, path = %project_path.display(), "pump imported");
    println!("✓ Added pump {} ({} points) to {}", id, points, project_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_solve_flags() {
        let cli = Cli::try_parse_from([
            "pf-cli", "-v", "solve", "plant.yaml", "--scenario", "Day", "--serial",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Solve {
                scenario,
                serial,
                grid,
                output,
                ..
            } => {
                assert_eq!(scenario.as_deref(), Some("Day"));
                assert!(serial);
                assert_eq!(grid, DEFAULT_INTERSECTION_SAMPLES);
                assert!(output.is_none());
            }
            _ => panic!("expected solve"),
        }
    }

    #[test]
    fn parses_bep_bands() {
        let cli = Cli::try_parse_from([
            "pf-cli", "bep", "plant.yaml", "pump-a", "--por", "0.8", "1.1",
        ])
        .unwrap();
        let Commands::Bep { por, aor, .. } = cli.command else {
            panic!("expected bep");
        };
        assert_eq!(band_or(por.as_deref(), DEFAULT_POR), Band::new(0.8, 1.1));
        assert_eq!(band_or(aor.as_deref(), DEFAULT_AOR), DEFAULT_AOR);
    }

    #[test]
    fn sample_defaults() {
        let cli = Cli::try_parse_from(["pf-cli", "sample", "plant.yaml", "pump-a"]).unwrap();
        let Commands::Sample { points, speed, .. } = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(points, DEFAULT_SAMPLE_POINTS);
        assert_eq!(speed, 1.0);
    }

    #[test]
    fn parses_import_csv() {
        let cli = Cli::try_parse_from([
            "pf-cli", "import-csv", "pump.csv", "--id", "pump-c", "--rated-speed", "1780",
        ])
        .unwrap();
        let Commands::ImportCsv {
            csv_path,
            id,
            name,
            rated_speed,
            project,
        } = cli.command
        else {
            panic!("expected import-csv");
        };
        assert_eq!(csv_path, PathBuf::from("pump.csv"));
        assert_eq!(id, "pump-c");
        assert!(name.is_none());
        assert_eq!(rated_speed, Some(1780.0));
        assert!(project.is_none());
        assert!(Cli::try_parse_from(["pf-cli", "import-csv", "pump.csv"]).is_err());
    }

    #[test]
    fn por_needs_two_values() {
        assert!(
            Cli::try_parse_from(["pf-cli", "bep", "plant.yaml", "pump-a", "--por", "0.8"])
                .is_err()
        );
    }
}

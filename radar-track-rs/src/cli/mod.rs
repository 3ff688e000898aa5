//! Command-line interface for the detection analysis tools.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{AnalysisConfig, Dataset, ScenarioPaths};
use crate::core::detections::{DetectionColumns, DetectionList, DetectionQuery};
use crate::core::loaders::{load_detections_csv, load_references_csv};
use crate::core::points::{DetectionPoint, SensorMount, Side};
use crate::core::references::{ReferenceColumns, ReferenceList, ReferenceQuery};
use crate::core::writers::write_detections_csv;
use crate::core::BeamSet;
use crate::visualization::{plot_detections, DetectionPlot};

#[derive(Parser)]
#[command(name = "radar-track")]
#[command(about = "Selection, inspection and plotting of recorded RADAR detections", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true, default_value = "./analysis.yaml")]
    config: PathBuf,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Which sensors to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RadarSelection {
    #[value(name = "L", alias = "left")]
    Left,
    #[value(name = "R", alias = "right")]
    Right,
    #[value(name = "B", alias = "both")]
    Both,
}

impl RadarSelection {
    fn includes(self, side: Side) -> bool {
        match self {
            RadarSelection::Both => true,
            RadarSelection::Left => side == Side::Left,
            RadarSelection::Right => side == Side::Right,
        }
    }
}

#[derive(Args)]
struct ScenarioArgs {
    /// Scenario name as listed in the config
    #[arg(short, long)]
    scenario: String,

    /// Recording campaign
    #[arg(short, long, value_enum, default_value_t = Dataset::New)]
    dataset: Dataset,

    /// Sensors to load
    #[arg(short, long, value_enum, default_value_t = RadarSelection::Both)]
    radars: RadarSelection,
}

#[derive(Args)]
struct SelectionArgs {
    /// Beams to keep, comma separated (defaults to the config's beams)
    #[arg(short, long, value_delimiter = ',')]
    beams: Vec<u8>,

    /// Attribute filter `key=value` or `key=low,high` (repeatable)
    #[arg(short = 'f', long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, Vec<f64>)>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scenarios defined in the config
    List,

    /// Print interval summaries of a scenario's recordings
    Summary {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },

    /// Plot the selected detections of a scenario as PNG
    Plot {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output folder (overrides the config's output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Write the selected detections of a scenario to CSV
    Export {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output CSV file
        output: PathBuf,
    },
}

/// Parse `key=v` or `key=lo,hi` into a key and its value list.
fn parse_filter(arg: &str) -> std::result::Result<(String, Vec<f64>), String> {
    let (key, values) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value[,value], got '{}'", arg))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing attribute name in '{}'", arg));
    }
    let values = values
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}' in '{}'", v, arg))
        })
        .collect::<std::result::Result<Vec<f64>, String>>()?;
    Ok((key.to_string(), values))
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let config = if cli.config.exists() {
        let cfg = AnalysisConfig::from_yaml(&cli.config)
            .with_context(|| format!("failed to load config {}", cli.config.display()))?;
        info!("Loaded config from: {}", cli.config.display());
        cfg
    } else {
        warn!("Config {} not found, using defaults", cli.config.display());
        AnalysisConfig::default()
    };

    match cli.command {
        Commands::List => cmd_list(&config),
        Commands::Summary { scenario } => cmd_summary(&config, &scenario),
        Commands::Plot {
            scenario,
            selection,
            output_dir,
        } => cmd_plot(&config, &scenario, &selection, output_dir),
        Commands::Export {
            scenario,
            selection,
            output,
        } => cmd_export(&config, &scenario, &selection, &output),
    }
}

/// Recordings of one scenario, loaded according to the radar selection.
struct LoadedScenario {
    paths: ScenarioPaths,
    left: Option<DetectionList>,
    right: Option<DetectionList>,
    dgps: Option<ReferenceList>,
}

impl LoadedScenario {
    fn load(config: &AnalysisConfig, args: &ScenarioArgs) -> Result<Self> {
        let paths = config.resolve_scenario(&args.scenario, args.dataset)?;
        let width = config.geometry.ego_car_width;

        let left = load_side(&paths.left_radar, SensorMount::left(width), args.radars)?;
        let right = load_side(&paths.right_radar, SensorMount::right(width), args.radars)?;
        if left.is_none() && right.is_none() {
            bail!(
                "scenario '{}' has no recording for the selected radars",
                paths.name
            );
        }

        let dgps = match paths.dgps() {
            Some(path) => {
                let spinner = create_spinner(&format!("Loading DGPS {}...", path.display()));
                let list = load_references_csv(path);
                spinner.finish_and_clear();
                Some(list.with_context(|| format!("failed to load DGPS {}", path.display()))?)
            }
            None => None,
        };

        Ok(Self {
            paths,
            left,
            right,
            dgps,
        })
    }

    fn sides(&self) -> impl Iterator<Item = (Side, &DetectionList)> + '_ {
        self.left
            .iter()
            .map(|list| (Side::Left, list))
            .chain(self.right.iter().map(|list| (Side::Right, list)))
    }
}

fn load_side(
    path: &Option<PathBuf>,
    mount: SensorMount,
    radars: RadarSelection,
) -> Result<Option<DetectionList>> {
    if !radars.includes(mount.side) {
        return Ok(None);
    }
    let Some(path) = path else {
        warn!("No {} radar recording configured", mount.side.label());
        return Ok(None);
    };

    let spinner = create_spinner(&format!("Loading {} radar {}...", mount.side.label(), path.display()));
    let list = load_detections_csv(path, mount);
    spinner.finish_and_clear();

    let list = list.with_context(|| format!("failed to load {}", path.display()))?;
    let (first, last) = list.mcc_interval();
    println!(
        "MCC {} starts at: {} and ends at: {}",
        mount.side.label(),
        first,
        last
    );
    Ok(Some(list))
}

/// Build the detection query from command line beams and filters.
fn build_query(config: &AnalysisConfig, selection: &SelectionArgs) -> Result<DetectionQuery> {
    let pairs = selection
        .filters
        .iter()
        .map(|(key, values)| (key.as_str(), values.as_slice()));
    let mut query = DetectionQuery::from_pairs(pairs).context("invalid filter")?;
    if !selection.beams.is_empty() {
        query.beam = Some(BeamSet::new(selection.beams.iter().copied()));
    } else if query.beam.is_none() {
        query.beam = Some(BeamSet::new(config.selection.beams.iter().copied()));
    }
    Ok(query)
}

/// DGPS samples overlapping the selected detections of either sensor.
///
/// Empty when neither sensor has a selected detection.
fn select_targets(
    dgps: &ReferenceList,
    left: Option<&DetectionColumns>,
    right: Option<&DetectionColumns>,
) -> ReferenceColumns {
    let span = |cols: &DetectionColumns| {
        let lo = cols.mcc.iter().copied().min()?;
        let hi = cols.mcc.iter().copied().max()?;
        Some((lo, hi))
    };

    let query = if let Some(mcc) = left.and_then(span) {
        ReferenceQuery::new().mcc_left(mcc)
    } else if let Some(mcc) = right.and_then(span) {
        ReferenceQuery::new().mcc_right(mcc)
    } else {
        return ReferenceColumns::default();
    };
    dgps.select_columns(&query)
}

fn cmd_list(config: &AnalysisConfig) -> Result<()> {
    if config.scenarios.is_empty() {
        println!("No scenarios configured");
        return Ok(());
    }
    for (name, files) in &config.scenarios {
        let mut recorded = Vec::new();
        if !files.left_radar.is_empty() {
            recorded.push("L");
        }
        if !files.right_radar.is_empty() {
            recorded.push("R");
        }
        if !(files.both_dgps.is_empty() && files.left_dgps.is_empty() && files.right_dgps.is_empty()) {
            recorded.push("DGPS");
        }
        println!("{:<30} {}", name, recorded.join(" "));
    }
    Ok(())
}

fn cmd_summary(config: &AnalysisConfig, args: &ScenarioArgs) -> Result<()> {
    let start = Instant::now();
    let scenario = LoadedScenario::load(config, args)?;

    for (side, list) in scenario.sides() {
        let (mcc_lo, mcc_hi) = list.mcc_interval();
        let busiest = match list.max_detections_per_mcc() {
            Some((count, mcc)) => format!("{} at MCC {}", count, mcc),
            None => "-".to_string(),
        };
        print_summary(
            &format!("{} radar: {}", side.label(), scenario.paths.name),
            &[
                ("Detections", list.len().to_string()),
                ("MCC", format!("[{}, {}]", mcc_lo, mcc_hi)),
                ("x (m)", list.x_interval().to_string()),
                ("y (m)", list.y_interval().to_string()),
                ("Range (m)", list.range_interval().to_string()),
                ("Velocity (m/s)", list.velocity_interval().to_string()),
                ("Azimuth (rad)", list.azimuth_interval().to_string()),
                ("Busiest cycle", busiest),
            ],
        );
    }

    if let Some(dgps) = &scenario.dgps {
        let (left_lo, left_hi) = dgps.mcc_left_interval();
        let (right_lo, right_hi) = dgps.mcc_right_interval();
        let (both_lo, both_hi) = dgps.mcc_both_interval();
        print_summary(
            &format!("DGPS: {}", scenario.paths.name),
            &[
                ("Samples", dgps.len().to_string()),
                ("MCC left", format!("[{}, {}]", left_lo, left_hi)),
                ("MCC right", format!("[{}, {}]", right_lo, right_hi)),
                ("MCC both", format!("[{}, {}]", both_lo, both_hi)),
                ("Duration", format!("{:.2?}", start.elapsed())),
            ],
        );
    }
    Ok(())
}

fn cmd_plot(
    config: &AnalysisConfig,
    args: &ScenarioArgs,
    selection: &SelectionArgs,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let start = Instant::now();
    let query = build_query(config, selection)?;
    let scenario = LoadedScenario::load(config, args)?;

    let output_path = match output_dir {
        Some(dir) => dir.join(format!("_tmp{}.png", scenario.paths.name)),
        None => scenario
            .paths
            .plot_path()
            .context("no output folder: pass --output-dir or set paths.output_dir")?,
    };
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let left = scenario.left.as_ref().map(|list| list.select_columns(&query));
    let right = scenario.right.as_ref().map(|list| list.select_columns(&query));
    let targets = scenario
        .dgps
        .as_ref()
        .map(|dgps| select_targets(dgps, left.as_ref(), right.as_ref()));

    let plot = DetectionPlot {
        left: left.as_ref(),
        right: right.as_ref(),
        targets: targets.as_ref(),
        target_x_offset: scenario.paths.dgps_x_compensation,
    };

    let spinner = create_spinner("Generating plot...");
    let result = plot_detections(&output_path, &plot, &scenario.paths.name);
    spinner.finish_and_clear();
    result.with_context(|| format!("failed to plot {}", output_path.display()))?;

    print_summary(
        "Plot Complete",
        &[
            ("Scenario", scenario.paths.name.clone()),
            ("Left detections", left.as_ref().map_or(0, |c| c.len()).to_string()),
            ("Right detections", right.as_ref().map_or(0, |c| c.len()).to_string()),
            ("DGPS samples", targets.as_ref().map_or(0, |c| c.len()).to_string()),
            ("Output PNG", output_path.display().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_export(
    config: &AnalysisConfig,
    args: &ScenarioArgs,
    selection: &SelectionArgs,
    output: &Path,
) -> Result<()> {
    let start = Instant::now();
    let query = build_query(config, selection)?;
    let scenario = LoadedScenario::load(config, args)?;

    let selected: Vec<&DetectionPoint> = scenario
        .sides()
        .flat_map(|(_, list)| list.select(&query))
        .collect();

    let rows = write_detections_csv(output, &selected)
        .with_context(|| format!("failed to export {}", output.display()))?;

    print_summary(
        "Export Complete",
        &[
            ("Scenario", scenario.paths.name.clone()),
            ("Rows written", rows.to_string()),
            ("Output CSV", output.display().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioFiles;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("mcc=100,200").unwrap(),
            ("mcc".to_string(), vec![100.0, 200.0])
        );
        assert_eq!(parse_filter(" x = 3.5").unwrap(), ("x".to_string(), vec![3.5]));
        assert!(parse_filter("mcc").is_err());
        assert!(parse_filter("=1").is_err());
        assert!(parse_filter("x=a").is_err());
    }

    #[test]
    fn test_cli_parses_plot_arguments() {
        let cli = Cli::try_parse_from([
            "radar-track", "plot", "-s", "overtake", "-d", "old", "-r", "L", "-b", "0,2", "-f",
            "x=0,40", "-o", "/tmp/out",
        ])
        .unwrap();
        match cli.command {
            Commands::Plot {
                scenario,
                selection,
                output_dir,
            } => {
                assert_eq!(scenario.scenario, "overtake");
                assert_eq!(scenario.dataset, Dataset::Old);
                assert_eq!(scenario.radars, RadarSelection::Left);
                assert_eq!(selection.beams, vec![0, 2]);
                assert_eq!(selection.filters, vec![("x".to_string(), vec![0.0, 40.0])]);
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/out")));
            }
            _ => panic!("expected plot command"),
        }
    }

    #[test]
    fn test_build_query_falls_back_to_config_beams() {
        let mut config = AnalysisConfig::default();
        config.selection.beams = vec![1];
        let selection = SelectionArgs {
            beams: vec![],
            filters: vec![("mcc".to_string(), vec![5.0])],
        };
        let query = build_query(&config, &selection).unwrap();
        assert_eq!(query.beam, Some(BeamSet::new([1])));

        let selection = SelectionArgs {
            beams: vec![3],
            filters: vec![],
        };
        assert_eq!(build_query(&config, &selection).unwrap().beam, Some(BeamSet::new([3])));

        let selection = SelectionArgs {
            beams: vec![],
            filters: vec![("doppler".to_string(), vec![1.0])],
        };
        assert!(build_query(&config, &selection).is_err());
    }

    #[test]
    fn test_load_scenario_respects_radar_selection() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("new");
        fs::create_dir_all(&data).unwrap();
        fs::write(
            data.join("left.csv"),
            "mcc,c1,beam,n,c4,range,vel,az\n10,0,1,1,0,5.0,0.5,0.0\n11,0,2,1,0,6.0,0.5,0.0\n",
        )
        .unwrap();

        let mut config = AnalysisConfig::default();
        config.paths.data_dir = dir.path().to_path_buf();
        config.scenarios.insert(
            "solo".to_string(),
            ScenarioFiles {
                left_radar: "left.csv".to_string(),
                ..Default::default()
            },
        );

        let args = ScenarioArgs {
            scenario: "solo".to_string(),
            dataset: Dataset::New,
            radars: RadarSelection::Both,
        };
        let loaded = LoadedScenario::load(&config, &args).unwrap();
        assert_eq!(loaded.left.as_ref().map(|l| l.len()), Some(2));
        assert!(loaded.right.is_none());
        assert!(loaded.dgps.is_none());
        assert_eq!(loaded.sides().count(), 1);

        let right_only = ScenarioArgs {
            radars: RadarSelection::Right,
            ..args
        };
        assert!(LoadedScenario::load(&config, &right_only).is_err());
    }

    #[test]
    fn test_select_targets_follows_left_cycles() {
        let dgps: ReferenceList = (0..10)
            .map(|i| crate::core::points::ReferencePoint {
                mcc_left: i,
                mcc_right: i + 100,
                ..Default::default()
            })
            .collect();
        let left = DetectionColumns {
            mcc: vec![3, 5, 4],
            ..Default::default()
        };
        let targets = select_targets(&dgps, Some(&left), None);
        assert_eq!(targets.mcc_left, vec![3, 4, 5]);

        let right = DetectionColumns {
            mcc: vec![108],
            ..Default::default()
        };
        let targets = select_targets(&dgps, None, Some(&right));
        assert_eq!(targets.mcc_left, vec![8]);
    }

    #[test]
    fn test_select_targets_empty_when_nothing_selected() {
        let dgps: ReferenceList = (0..10)
            .map(|i| crate::core::points::ReferencePoint {
                mcc_left: i,
                mcc_right: i + 100,
                ..Default::default()
            })
            .collect();
        let empty = DetectionColumns::default();

        assert!(select_targets(&dgps, Some(&empty), Some(&empty)).is_empty());
        assert!(select_targets(&dgps, None, None).is_empty());

        // The empty targets keep the plot guard in place.
        let targets = select_targets(&dgps, Some(&empty), None);
        let plot = DetectionPlot {
            left: Some(&empty),
            targets: Some(&targets),
            ..Default::default()
        };
        assert!(plot.is_empty());
    }
}

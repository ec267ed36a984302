use clap::Parser;
use homing::database::{load_grid, load_route};
use homing::eval::{mean_absolute_error, mean_angular_error, percent_correct, HeadingSample};
use homing::matching::DenseLayer;
use homing::{
    evaluate_grid, evaluate_route, Bounds, DirImageStore, FamiliarityModel,
    GridEvaluationRecord, HeadingDomain, LearnedMatcher, Mlp, PerfectMemory, Route,
    RouteEvaluationRecord, SweepConfig, ViewConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Visual homing evaluation (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Score a previously written grid records CSV instead of sweeping.
    #[arg(long, value_name = "CSV")]
    records: Option<PathBuf>,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Task {
    #[default]
    Grid,
    Route,
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StrategyConfig {
    #[default]
    PerfectMemory,
    Mlp { weights_path: String },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct HeadingConfigJson {
    vis_deg: i32,
    rot_deg: i32,
}

impl Default for HeadingConfigJson {
    fn default() -> Self {
        Self {
            vis_deg: 360,
            rot_deg: 4,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ViewConfigJson {
    width: usize,
    height: usize,
}

impl Default for ViewConfigJson {
    fn default() -> Self {
        let cfg = ViewConfig::default();
        Self {
            width: cfg.width,
            height: cfg.height,
        }
    }
}

impl From<&ViewConfigJson> for ViewConfig {
    fn from(value: &ViewConfigJson) -> Self {
        ViewConfig {
            width: value.width,
            height: value.height,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SweepConfigJson {
    spacing: i32,
    /// `[[min_x, min_y], [max_x, max_y]]` in map units.
    bounds: Option<[[i32; 2]; 2]>,
    corridor: Option<i32>,
    parallel: bool,
}

impl Default for SweepConfigJson {
    fn default() -> Self {
        let cfg = SweepConfig::default();
        Self {
            spacing: cfg.spacing,
            bounds: None,
            corridor: cfg.corridor,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    task: Task,
    route_db: String,
    route_images: String,
    grid_db: String,
    grid_images: String,
    output_path: Option<String>,
    summary_path: Option<String>,
    heading: HeadingConfigJson,
    view: ViewConfigJson,
    sweep: SweepConfigJson,
    route_step: usize,
    threshold_deg: i32,
    strategy: StrategyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task: Task::default(),
            route_db: String::new(),
            route_images: String::new(),
            grid_db: String::new(),
            grid_images: String::new(),
            output_path: None,
            summary_path: None,
            heading: HeadingConfigJson::default(),
            view: ViewConfigJson::default(),
            sweep: SweepConfigJson::default(),
            route_step: 1,
            threshold_deg: 20,
            strategy: StrategyConfig::default(),
        }
    }
}

impl Config {
    fn sweep_config(&self) -> CliResult<SweepConfig> {
        let bounds = match self.sweep.bounds {
            Some([[min_x, min_y], [max_x, max_y]]) => {
                Some(Bounds::new((min_x, min_y), (max_x, max_y))?)
            }
            None => None,
        };
        Ok(SweepConfig {
            spacing: self.sweep.spacing,
            bounds,
            corridor: self.sweep.corridor,
            parallel: self.sweep.parallel,
            view: (&self.view).into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LayerJson {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl TryFrom<LayerJson> for DenseLayer {
    type Error = homing::HomingError;

    fn try_from(value: LayerJson) -> Result<Self, Self::Error> {
        DenseLayer::new(value.inputs, value.outputs, value.weights, value.bias)
    }
}

#[derive(Debug, Deserialize)]
struct MlpJson {
    hidden: Vec<LayerJson>,
    output: LayerJson,
}

fn load_mlp(path: &str) -> CliResult<Mlp> {
    let json: MlpJson = serde_json::from_str(&fs::read_to_string(path)?)?;
    let hidden = json
        .hidden
        .into_iter()
        .map(DenseLayer::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Mlp::new(hidden, json.output.try_into()?)?)
}

fn build_model(
    config: &Config,
    route: &Route,
    store: &DirImageStore,
) -> CliResult<Box<dyn FamiliarityModel + Sync>> {
    let view = ViewConfig::from(&config.view);
    let model: Box<dyn FamiliarityModel + Sync> = match &config.strategy {
        StrategyConfig::PerfectMemory => Box::new(PerfectMemory::from_route(route, store, &view)?),
        StrategyConfig::Mlp { weights_path } => {
            let mlp = load_mlp(weights_path)?;
            Box::new(LearnedMatcher::from_route(route, store, &view, mlp)?)
        }
    };
    Ok(model)
}

#[derive(Debug, Serialize)]
struct Summary {
    samples: usize,
    mean_absolute_error: f64,
    mean_angular_error: f64,
    percent_correct: f64,
    threshold_deg: i32,
}

impl Summary {
    fn compute<R: HeadingSample>(records: &[R], route: &Route, threshold_deg: i32) -> CliResult<Self> {
        let summary = Self {
            samples: records.len(),
            mean_absolute_error: mean_absolute_error(records, route)?,
            mean_angular_error: mean_angular_error(records, route)?,
            percent_correct: percent_correct(records, route, threshold_deg)?,
            threshold_deg,
        };
        tracing::info!(
            samples = summary.samples,
            mae = summary.mean_absolute_error,
            percent_correct = summary.percent_correct,
            "evaluation summary"
        );
        Ok(summary)
    }
}

#[derive(Debug, Serialize)]
struct RouteOutput {
    summary: Summary,
    records: Vec<RouteEvaluationRecord>,
}

fn write_records(path: &str, records: &[GridEvaluationRecord]) -> CliResult<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_records(path: &Path) -> CliResult<Vec<GridEvaluationRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<GridEvaluationRecord>, csv::Error>>()?;
    Ok(records)
}

fn emit(json: String, path: Option<&str>) -> CliResult<()> {
    match path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("homing=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.route_db.is_empty() {
        return Err("route_db must be set in the config".into());
    }

    let domain = HeadingDomain::new(config.heading.vis_deg, config.heading.rot_deg)?;
    let route = load_route(&config.route_db, domain)?;

    if let Some(path) = &cli.records {
        let records = read_records(path)?;
        let summary = Summary::compute(&records, &route, config.threshold_deg)?;
        return emit(serde_json::to_string_pretty(&summary)?, config.summary_path.as_deref());
    }

    if config.route_images.is_empty() {
        return Err("route_images must be set in the config".into());
    }
    let route_store = DirImageStore::new(&config.route_images);
    let model = build_model(&config, &route, &route_store)?;

    match config.task {
        Task::Grid => {
            if config.grid_db.is_empty() || config.grid_images.is_empty() {
                return Err("grid_db and grid_images must be set for the grid task".into());
            }
            let grid = load_grid(&config.grid_db, domain)?;
            let grid_store = DirImageStore::new(&config.grid_images);
            let sweep = config.sweep_config()?;
            let records = evaluate_grid(&*model, &grid_store, &grid, &route, &sweep)?;
            if let Some(path) = &config.output_path {
                write_records(path, &records)?;
            }
            let summary = Summary::compute(&records, &route, config.threshold_deg)?;
            emit(serde_json::to_string_pretty(&summary)?, config.summary_path.as_deref())
        }
        Task::Route => {
            let view = ViewConfig::from(&config.view);
            let records = evaluate_route(&*model, &route_store, &route, &view, config.route_step)?;
            let summary = Summary::compute(&records, &route, config.threshold_deg)?;
            let output = RouteOutput { summary, records };
            let json = serde_json::to_string_pretty(&output)?;
            emit(json, config.output_path.as_deref())
        }
    }
}

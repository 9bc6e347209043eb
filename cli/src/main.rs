//! Longitudinal IMDP CLI
//!
//! Builds the interval MDP abstraction and writes it as a PRISM model

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use longitudinal_imdp_core::{
    compare_presets, load_config, AbstractionConfig, AbstractionEngine, AbstractionError,
    BoundaryMode, ContinuousState, GridPreset, Result, ThresholdPreset,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "imdp-abstract")]
#[command(version)]
#[command(about = "Interval MDP abstraction of a longitudinal vehicle-following model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the full abstraction and write the PRISM model
    Generate {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Grid preset (debug, coarse, medium, fine); ignored if the config sets a resolution
        #[arg(long)]
        preset: Option<GridPreset>,

        /// Controller preset (safe, industry) or "none"
        #[arg(long)]
        controller: Option<String>,

        /// Handling of probability that leaves the grid
        #[arg(long, value_enum)]
        boundary: Option<BoundaryArg>,

        /// Output PRISM file
        #[arg(long, short = 'o', default_value = "abstraction.prism")]
        output: PathBuf,

        /// Run on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Check which grid presets resolve a braking step from 20 m/s
    Compare {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reference state (position, velocity, acceleration)
        #[arg(
            long,
            num_args = 3,
            value_names = ["X", "V", "A"],
            default_values_t = [50.0, 20.0, 0.0],
            allow_negative_numbers = true
        )]
        state: Vec<f64>,

        /// Commanded acceleration
        #[arg(long, default_value_t = -4.0, allow_negative_numbers = true)]
        acceleration: f64,
    },

    /// Show the interval transitions of the cell holding one state
    Probe {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(
            long,
            num_args = 3,
            value_names = ["X", "V", "A"],
            required = true,
            allow_negative_numbers = true
        )]
        state: Vec<f64>,

        /// Action name from the configured action set
        #[arg(long)]
        action: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BoundaryArg {
    Truncate,
    Sink,
}

impl From<BoundaryArg> for BoundaryMode {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Truncate => BoundaryMode::Truncate,
            BoundaryArg::Sink => BoundaryMode::Sink,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate {
            config,
            preset,
            controller,
            boundary,
            output,
            sequential,
        } => generate(config, preset, controller, boundary, output, sequential),
        Command::Compare {
            config,
            state,
            acceleration,
        } => compare(config, &state, acceleration),
        Command::Probe {
            config,
            state,
            action,
        } => probe(config, &state, &action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_config(path: Option<PathBuf>) -> Result<AbstractionConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Ok(load_config(path)?)
        }
        None => Ok(AbstractionConfig::default()),
    }
}

fn state_arg(values: &[f64]) -> Result<ContinuousState> {
    match values {
        [x, v, a] => Ok(ContinuousState::new(*x, *v, *a)),
        _ => Err(AbstractionError::config("--state takes exactly three values")),
    }
}

fn generate(
    config: Option<PathBuf>,
    preset: Option<GridPreset>,
    controller: Option<String>,
    boundary: Option<BoundaryArg>,
    output: PathBuf,
    sequential: bool,
) -> Result<()> {
    let mut config = read_config(config)?;

    if let Some(preset) = preset {
        config.grid.preset = preset;
    }
    if let Some(name) = controller {
        config.controller.preset = match name.as_str() {
            "none" => None,
            other => Some(other.parse::<ThresholdPreset>()?),
        };
    }
    if let Some(boundary) = boundary {
        config.engine.boundary = boundary.into();
    }
    if sequential {
        config.pipeline.parallel = false;
    }
    config.validate()?;

    let grid = config.build_grid()?;
    let plant = config.build_plant()?;
    let compiler = config.build_compiler();
    let pipeline = config.build_pipeline();

    let mdp = pipeline.execute(&plant, &grid, compiler.as_ref())?;
    mdp.write_prism(&output)?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn compare(config: Option<PathBuf>, state: &[f64], acceleration: f64) -> Result<()> {
    let config = read_config(config)?;
    let plant = config.build_plant()?;
    let reference = state_arg(state)?;

    let rows = compare_presets(
        &plant,
        config.grid.bounds.to_array(),
        &GridPreset::ALL,
        config.engine,
        reference,
        acceleration,
    )?;

    println!(
        "{:<8} | {:<20} | {:>9} | {:>9} | {:>12} | {:>12} | status",
        "preset", "resolution (x,v,a)", "states", "epsilon", "dv (centers)", "dv (mean)"
    );
    println!("{}", "-".repeat(100));
    for row in rows {
        let fmt_delta =
            |d: Option<f64>| d.map_or_else(|| "-".to_string(), |d| format!("{:+.4}", d));
        println!(
            "{:<8} | {:<20} | {:>9} | {:>9.4} | {:>12} | {:>12} | {}",
            row.preset.name(),
            format!("{:?}", row.resolution),
            row.states,
            row.error_margin,
            fmt_delta(row.center_delta_v),
            fmt_delta(row.distribution_delta_v),
            row.status
        );
    }
    Ok(())
}

fn probe(config: Option<PathBuf>, state: &[f64], action: &str) -> Result<()> {
    let config = read_config(config)?;
    let grid = config.build_grid()?;
    let plant = config.build_plant()?;
    let engine = AbstractionEngine::new(&plant, &grid, config.engine)?;
    let state = state_arg(state)?;

    let acceleration = config
        .actions
        .get(action)
        .map(|a| a.acceleration)
        .ok_or_else(|| {
            AbstractionError::config(format!(
                "Unknown action '{}' (configured: {})",
                action,
                config.actions.names().join(", ")
            ))
        })?;

    let index = grid
        .state_to_index(&state)
        .ok_or_else(|| AbstractionError::config(format!("State {} lies outside the grid", state)))?;

    let probe = engine.probe(&index, acceleration);

    println!("Grid:      {}", grid);
    println!("Cell:      {} (id {})", index, grid.flatten(&index));
    println!("Center:    {}", probe.source_center);
    println!("Image:     {}  [{} = {:+}]", probe.image, action, acceleration);
    println!("Epsilon:   {:.6}", engine.error_margin());
    println!("Targets:   {}", probe.transitions.len());
    if let Some(id) = probe.dominant {
        println!("Dominant:  {}", id);
    }
    if let Some(mean) = probe.mean_target_center {
        println!("Mean cell: {}", mean);
    }
    if let Some(mean) = probe.mean_next_state {
        println!("Mean next: {}", mean);
    }
    for (target, interval) in &probe.transitions {
        let cell = grid
            .unflatten(*target)
            .map_or_else(|| "escape".to_string(), |i| i.to_string());
        println!("  s'={:<8} {:<16} {}", target.0, cell, interval);
    }

    if let Some(live) = config.build_live_controller()? {
        let out = live.step(true, probe.source_center.position, probe.source_center.velocity);
        println!(
            "Controller ({}): {} -> {:+}",
            live.preset(),
            out.label,
            out.acceleration
        );
    }
    Ok(())
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rocket_range::{
    compare_wind,
    telemetry_system::telemetry::{format_distance, optimization_report},
    FlightSummary, GroundPolicy, LaunchParameters, OptimizerSettings, PhysicalConfig,
    RangeOptimizer, Wind, DEFAULT_LAUNCH_ANGLE_DEG, DEFAULT_THRUST, MAX_LAUNCH_ANGLE_DEG,
    MAX_THRUST, MIN_LAUNCH_ANGLE_DEG, MIN_THRUST,
};

#[derive(Parser)]
#[command(about = "2-D rocket trajectory simulation and range optimization")]
struct Cli {
    /// JSON file with physical configuration overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// What to do when the rocket reaches the ground.
    #[arg(long, global = true, value_enum)]
    ground: Option<GroundArg>,

    /// Emit results as JSON instead of a text summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fly one launch, in calm air and under the configured wind.
    Simulate {
        /// Launch angle above horizontal, in degrees.
        #[arg(long, default_value_t = DEFAULT_LAUNCH_ANGLE_DEG)]
        angle: f64,

        /// Peak thrust at ignition, in newtons.
        #[arg(long, default_value_t = DEFAULT_THRUST)]
        thrust: f64,

        #[command(flatten)]
        wind: WindArgs,
    },
    /// Search launch angle and thrust for maximum range.
    Optimize {
        #[arg(long, default_value_t = MIN_LAUNCH_ANGLE_DEG)]
        min_angle: f64,
        #[arg(long, default_value_t = MAX_LAUNCH_ANGLE_DEG)]
        max_angle: f64,
        #[arg(long, default_value_t = MIN_THRUST)]
        min_thrust: f64,
        #[arg(long, default_value_t = MAX_THRUST)]
        max_thrust: f64,

        /// Starting launch angle, in degrees.
        #[arg(long, default_value_t = DEFAULT_LAUNCH_ANGLE_DEG)]
        angle: f64,

        /// Starting peak thrust, in newtons.
        #[arg(long, default_value_t = DEFAULT_THRUST)]
        thrust: f64,

        /// Extra random starting points.
        #[arg(long, default_value_t = 0)]
        restarts: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[command(flatten)]
        wind: WindArgs,
    },
}

#[derive(Args)]
struct WindArgs {
    /// Gust amplitude in m/s (sinusoidal wind).
    #[arg(long, conflicts_with = "steady_wind")]
    gust_amplitude: Option<f64>,

    /// Gust angular frequency in rad/s.
    #[arg(long, default_value_t = rocket_range::GUST_ANGULAR_FREQUENCY)]
    gust_frequency: f64,

    /// Steady wind in m/s, positive downrange.
    #[arg(long)]
    steady_wind: Option<f64>,
}

impl WindArgs {
    fn to_wind(&self) -> Wind {
        match (self.gust_amplitude, self.steady_wind) {
            (Some(amplitude), _) => Wind::sinusoidal(amplitude, self.gust_frequency),
            (None, Some(speed)) => Wind::constant(speed),
            (None, None) => Wind::Calm,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GroundArg {
    Halt,
    Clamp,
}

impl From<GroundArg> for GroundPolicy {
    fn from(arg: GroundArg) -> Self {
        match arg {
            GroundArg::Halt => GroundPolicy::HaltOnLanding,
            GroundArg::Clamp => GroundPolicy::ClampAndContinue,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PhysicalConfig::from_json_file(path)?,
        None => PhysicalConfig::reference(),
    };
    if let Some(ground) = cli.ground {
        config = config.with_ground_policy(ground.into());
    }

    match &cli.command {
        Command::Simulate {
            angle,
            thrust,
            wind,
        } => {
            let params = LaunchParameters::from_degrees(*angle, *thrust).with_wind(wind.to_wind());
            let comparison = compare_wind(&config, &params)?;
            let without = FlightSummary::from_result(&comparison.without_wind);
            let with = FlightSummary::from_result(&comparison.with_wind);

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "without_wind": without, "with_wind": with })
                );
            } else {
                println!("--- Without wind ---\n{}", without.report());
                if !params.wind.is_calm() {
                    println!("\n--- With wind ---\n{}", with.report());
                    println!(
                        "\nRange shift from wind: {}",
                        format_distance(comparison.range_shift())
                    );
                }
            }
        }
        Command::Optimize {
            min_angle,
            max_angle,
            min_thrust,
            max_thrust,
            angle,
            thrust,
            restarts,
            seed,
            wind,
        } => {
            let settings = OptimizerSettings {
                restarts: *restarts,
                seed: *seed,
                ..OptimizerSettings::default()
            };
            let result = RangeOptimizer::new(&config)
                .with_wind(wind.to_wind())
                .with_settings(settings)
                .optimize(
                    (min_angle.to_radians(), max_angle.to_radians()),
                    (*min_thrust, *max_thrust),
                    (angle.to_radians(), *thrust),
                )?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", optimization_report(&result));
            }
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use bridge_sim::simulation::{
    BridgeConfig, BridgeSide, DependentVariable, IndependentVariable, Model2, Model2PlotFunction,
    ModelSettings, ZeroComponentPolicy, CONSTANT_STRINGS, DEFAULT_MAX_CYCLES,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ZeroPolicyArg {
    /// Record zero components as zero
    Zero,
    /// Record zero components as infinity
    Infinite,
}

impl From<ZeroPolicyArg> for ZeroComponentPolicy {
    fn from(arg: ZeroPolicyArg) -> Self {
        match arg {
            ZeroPolicyArg::Zero => ZeroComponentPolicy::ReportZero,
            ZeroPolicyArg::Infinite => ZeroComponentPolicy::Infinite,
        }
    }
}

#[derive(Parser)]
#[command(name = "bridge_sim")]
#[command(about = "Give-way bridge queue simulation (Model 2)")]
struct Cli {
    /// Bridge length in metres
    #[arg(long, default_value = "200")]
    bridge_length: f64,

    /// Car length in metres
    #[arg(long, default_value = "4.8")]
    car_length: f64,

    /// Crossing velocity in km/h
    #[arg(long, default_value = "40")]
    velocity: f64,

    /// Arrival rate on side i, vehicles per minute
    #[arg(long, default_value = "10")]
    qi: f64,

    /// Arrival rate on side j, vehicles per minute
    #[arg(long, default_value = "10")]
    qj: f64,

    /// Maximum green duration in seconds
    #[arg(long, default_value = "120")]
    tg_max: f64,

    /// Vehicles queued on each side when a run starts
    #[arg(long, default_value = "0")]
    initial_queue: u64,

    /// Target arrival index stored with the configuration
    #[arg(long, default_value = "5")]
    n: i64,

    /// First arrival index of the sweep
    #[arg(long, default_value = "1")]
    n_min: i64,

    /// Last arrival index of the sweep
    #[arg(long, default_value = "50")]
    n_max: i64,

    /// Independent variable (N or t)
    #[arg(long, default_value = "N")]
    x_var: IndependentVariable,

    /// Dependent variable (tw, psi_a, psi_c, psi_d, psi_ar, psi_ag)
    #[arg(long, default_value = "tw")]
    y_var: DependentVariable,

    /// How zero waiting-time components are recorded
    #[arg(long, value_enum, default_value = "zero")]
    zero_policy: ZeroPolicyArg,

    /// Joint cycles allowed per run stage
    #[arg(long, default_value_t = DEFAULT_MAX_CYCLES)]
    max_cycles: usize,

    /// Print the side i state table for every N
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,bridge_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    let config = BridgeConfig {
        bridge_length: cli.bridge_length,
        car_length: cli.car_length,
        crossing_velocity_kmph: cli.velocity,
        arrival_rate_i: cli.qi,
        arrival_rate_j: cli.qj,
        tg_max: cli.tg_max,
        n: cli.n,
    };
    let settings = ModelSettings {
        max_cycles: cli.max_cycles,
        zero_policy: cli.zero_policy.into(),
        ..ModelSettings::default()
    };

    let mut model = Model2::from_config(&config, settings).context("Failed to configure model")?;
    model.set_initial_queues(cli.initial_queue, cli.initial_queue);

    print_config(&model);

    if cli.trace {
        print_trace(&mut model, cli.n_min, cli.n_max)?;
    }

    let mut plot_function = Model2PlotFunction::new(model);
    let plot = plot_function
        .plot(cli.x_var, cli.y_var, cli.n_min, cli.n_max)
        .with_context(|| format!("Sweep over N = [{}, {}] failed", cli.n_min, cli.n_max))?;

    println!("{} {}", plot.x_var, plot.y_var);
    for (x, y) in plot.xdata.iter().zip(&plot.ydata) {
        println!("{} {}", x, y);
    }
    println!();

    info!("=== SWEEP COMPLETE ===");
    println!("=== Sweep Summary ===");
    println!("Plot type: {}", plot_function.plot_type_string());
    println!("Series length: {}", plot.ydata.len());
    println!(
        "x range: [{:.3}, {:.3}], y range: [{:.3}, {:.3}]",
        plot.limits.xmin, plot.limits.xmax, plot.limits.ymin, plot.limits.ymax
    );

    Ok(())
}

fn print_config(model: &Model2) {
    println!("=== Bridge Configuration ===");
    for (label, value) in CONSTANT_STRINGS.iter().zip(model.get_constant_vals()) {
        println!("  {}: {}", label, value);
    }
    println!("  h0: {:.3}s, trij: {:.3}s", model.props.h0, model.props.trij);
    println!();
}

/// Run each N on its own and print the side i state after it
fn print_trace(model: &mut Model2, n_min: i64, n_max: i64) -> Result<()> {
    println!("{}", BridgeSide::table_header());
    for n in n_min..=n_max {
        if model
            .run_simulation(n)
            .with_context(|| format!("Run for N = {} failed", n))?
            .is_some()
        {
            println!("{}", model.side_i.table_row(n));
        }
    }
    println!();
    Ok(())
}

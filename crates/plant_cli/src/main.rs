use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plant_control::{BreakdownConfig, BreakdownController, EventSource};
use plant_core::{factory_report, floor_status, unit_report, Event, Factory, UnitReport};
use plant_world::{build_factory, load_config};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "plant_cli", about = "Production floor simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a factory description for a fixed number of minutes.
    Run {
        #[arg(long, default_value = "./content/sawmill.json")]
        config: PathBuf,
        #[arg(long)]
        minutes: u64,
        #[arg(long, default_value_t = 60)]
        print_every: u64,
        /// Seed for the breakdown controller.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Chance per minute that a running unit breaks down.
        #[arg(long, default_value_t = 0.0)]
        failure_probability: f64,
        #[arg(long, default_value_t = 30)]
        repair_ticks: u64,
        /// Print the final reports as JSON.
        #[arg(long)]
        json: bool,
    },
}

struct RunArgs {
    config: PathBuf,
    minutes: u64,
    print_every: u64,
    seed: u64,
    breakdowns: BreakdownConfig,
    json: bool,
}

#[derive(Serialize)]
struct FinalReport {
    factory: plant_core::FactoryReport,
    units: Vec<UnitReport>,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(args: &RunArgs) -> Result<()> {
    let def = load_config(&args.config)?;
    let mut factory = build_factory(&def);
    let mut controller = BreakdownController::new(args.breakdowns, args.seed);
    let print_every = args.print_every.max(1);

    println!(
        "Starting factory '{}': minutes={} units={} workers={} failure_probability={}",
        factory.name,
        args.minutes,
        factory.floor.units.len(),
        factory.floor.workers.len(),
        args.breakdowns.failure_probability,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..args.minutes {
        for (unit, event) in controller.generate_events(&factory) {
            if let Err(err) = factory.apply_event(&unit, event) {
                tracing::warn!(unit = %unit, error = %err, "external event rejected");
            }
        }
        let events = factory.do_step();

        // Print notable events regardless of print_every.
        for event in &events {
            if let Event::DayOfWorkIsOver { worker_id } = &event.event {
                println!(
                    "*** DAY OVER: {worker_id} at minute={:04} ***",
                    event.tick
                );
            }
        }

        if factory.current_time().is_multiple_of(print_every) {
            print_status(&factory);
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at minute {}:", factory.current_time());
    print_status(&factory);
    print_reports(&factory, args.json)
}

fn print_status(factory: &Factory) {
    let minute = factory.current_time();
    let day = minute / 1440;
    let hour = (minute % 1440) / 60;
    for line in floor_status(factory) {
        let stock = |materials: &[plant_core::Material]| {
            materials
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "[minute={minute:04}  day={day}  hour={hour:02}]  {name:<12} {state:<9}  in=[{inputs}]  out=[{outputs}]",
            name = line.name,
            state = line.state.to_string(),
            inputs = stock(&line.inputs),
            outputs = stock(&line.outputs),
        );
    }
}

fn print_reports(factory: &Factory, json: bool) -> Result<()> {
    let units: Vec<UnitReport> = factory
        .floor
        .units
        .values()
        .filter_map(|unit| unit_report(factory, &unit.name))
        .collect();
    let report = FinalReport {
        factory: factory_report(factory),
        units,
    };
    if json {
        let text = serde_json::to_string_pretty(&report).context("serializing final report")?;
        println!("{text}");
        return Ok(());
    }
    println!(
        "time={} units={} workers={}",
        report.factory.current_time,
        report.factory.production_unit_count,
        report.factory.worker_count,
    );
    for unit in &report.units {
        println!(
            "  {:<12} state={:<9} produced={:.1} value={:.2} types=[{}]",
            unit.name,
            unit.state.to_string(),
            unit.units_produced,
            unit.value_produced,
            unit.produced_material_types.join(", "),
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            minutes,
            print_every,
            seed,
            failure_probability,
            repair_ticks,
            json,
        } => {
            run(&RunArgs {
                config,
                minutes,
                print_every,
                seed,
                breakdowns: BreakdownConfig {
                    failure_probability,
                    repair_ticks,
                },
                json,
            })?;
        }
    }
    Ok(())
}

//! Rig assembly and command execution against the simulated backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use eyre::WrapErr;
use pomsort_config::Config;
use pomsort_core::sequencer::{Plan, RunOutcome, Sequencer};
use pomsort_core::{GuardCfg, Rig};
use pomsort_hardware::SimWorld;
use pomsort_traits::{AnalogInput, DigitalInput, Side};

/// Build the boxed rig over one shared simulated world.
fn build_rig(
    cfg: &Config,
    world: &SimWorld,
    guard: GuardCfg,
    halt: Arc<AtomicBool>,
) -> eyre::Result<Rig> {
    Rig::builder()
        .with_bumpers(world.bumper(Side::Left), world.bumper(Side::Right))
        .with_line_sensors(
            world.line_sensor(Side::Left),
            world.line_sensor(Side::Right),
        )
        .with_distance_sensor(world.distance_sensor())
        .with_motors(world.motor(Side::Left), world.motor(Side::Right))
        .with_servo(world.servo())
        .with_thresholds((&cfg.thresholds).into())
        .with_servo_positions((&cfg.servo).into())
        .with_drive((&cfg.drive).into())
        .with_tick_gates((&cfg.ticks).into())
        .with_guard(guard)
        .with_halt_check(move || halt.load(Ordering::Relaxed))
        .build()
        .wrap_err("assembling rig")
}

/// Execute the standard plan. Returns an error (with a typed AbortReason
/// attached) when the run does not complete.
pub fn run_plan(
    cfg: &Config,
    max_maneuver_ms: Option<u64>,
    print_runtime: bool,
) -> eyre::Result<()> {
    let mut guard: GuardCfg = (&cfg.guard).into();
    if let Some(ms) = max_maneuver_ms {
        guard.max_maneuver_ms = if ms == 0 { None } else { Some(ms) };
    }

    let halt = Arc::new(AtomicBool::new(false));
    let halt_flag = halt.clone();
    ctrlc::set_handler(move || {
        halt_flag.store(true, Ordering::Relaxed);
    })
    .wrap_err("installing Ctrl-C handler")?;

    let world = SimWorld::new();
    let mut rig = build_rig(cfg, &world, guard, halt)?;
    rig.enable_actuators()?;

    let plan = Plan::standard_run(&(&cfg.drive).into());
    let sequencer = Sequencer::new(plan);

    let started = Instant::now();
    let report = sequencer.run(&mut rig)?;
    let elapsed = started.elapsed();

    for step in &report.steps {
        tracing::info!(step = step.name, status = ?step.status, attempts = step.attempts, "step finished");
    }
    if print_runtime {
        println!("runtime: {:.3}s", elapsed.as_secs_f64());
    }

    match report.outcome {
        RunOutcome::Completed => {
            println!("run complete: {} steps", report.steps.len());
            Ok(())
        }
        RunOutcome::Aborted(reason) => {
            Err(eyre::Report::new(reason)).wrap_err("run aborted")
        }
    }
}

/// Print the standard plan without executing it.
pub fn print_plan(cfg: &Config) {
    let plan = Plan::standard_run(&(&cfg.drive).into());
    println!("standard run plan ({} steps):", plan.steps().len());
    for (i, step) in plan.steps().iter().enumerate() {
        println!("  {}. {} - {:?}", i + 1, step.name, step.maneuver);
    }
}

/// Sample every simulated sensor once and report the values.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let world = SimWorld::new();
    let boxed =
        |e: Box<dyn std::error::Error + Send + Sync>| eyre::eyre!("sensor read failed: {e}");

    let bump_left = world.bumper(Side::Left).is_pressed().map_err(boxed)?;
    let bump_right = world.bumper(Side::Right).is_pressed().map_err(boxed)?;
    let line_left = world.line_sensor(Side::Left).read().map_err(boxed)?;
    let line_right = world.line_sensor(Side::Right).read().map_err(boxed)?;
    let distance = world.distance_sensor().read().map_err(boxed)?;

    let mut servo = world.servo();
    use pomsort_traits::SortServo;
    servo.enable().map_err(boxed)?;
    servo.set_position(cfg.servo.middle).map_err(boxed)?;

    println!(
        "self-check ok: bumps=({bump_left},{bump_right}) line=({line_left},{line_right}) distance={distance} servo={}",
        world.servo_position()
    );
    Ok(())
}

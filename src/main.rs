//! Headless demo: a four-wheel vehicle doing a burnout, then coasting to rest.
//!
//! Logs the vehicle's live particle count every few frames. Pass a settings
//! file (`.ron`) as the first argument to override the default coefficients.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_surface_particles::constants::surfaces;
use bevy_surface_particles::prelude::*;

const FRAMES: u32 = 240;
const BURNOUT_FRAMES: u32 = 90;

#[derive(Resource, Default)]
struct DemoSettings(SurfaceParticleSettings);

fn main() {
    let settings = match std::env::args().nth(1) {
        Some(path) => SurfaceParticleSettings::load(&path).unwrap_or_else(|e| {
            eprintln!("Using default settings: {e}");
            SurfaceParticleSettings::default()
        }),
        None => SurfaceParticleSettings::default(),
    };

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
            LogPlugin::default(),
        ))
        .add_plugins(SurfaceParticlePlugin)
        .insert_resource(DemoSettings(settings))
        .add_systems(Startup, spawn_vehicle)
        .add_systems(Update, (drive, report).chain())
        .run();
}

fn spawn_vehicle(mut commands: Commands, settings: Res<DemoSettings>) {
    let mut wheels = vec![WheelState::on(surfaces::ASPHALT); 4];
    // Rear wheels sit on the gravel verge.
    wheels[2].surface = surfaces::GRAVEL;
    wheels[3].surface = surfaces::GRAVEL;

    commands.spawn((
        Name::new("Demo Vehicle"),
        SurfaceParticleManager::new(settings.0),
        WheelStates(wheels),
    ));
}

/// Spin the front wheels for a while, then let everything roll to a stop.
fn drive(mut frame: Local<u32>, mut vehicles: Query<&mut WheelStates>) {
    *frame += 1;
    let burnout = *frame <= BURNOUT_FRAMES;
    for mut wheels in &mut vehicles {
        for (index, wheel) in wheels.0.iter_mut().enumerate() {
            let front = index < 2;
            wheel.longitudinal_slip = if burnout && front { 0.9 } else { 0.0 };
            wheel.lateral_slip = if burnout && front { 0.2 } else { 0.0 };
            wheel.speed = if burnout { 12.0 } else { 0.0 };
        }
    }
}

fn report(
    mut frame: Local<u32>,
    vehicles: Query<(&Name, &SurfaceParticleManager)>,
    mut exit: MessageWriter<AppExit>,
) {
    *frame += 1;
    if *frame % 30 == 0 {
        for (name, manager) in &vehicles {
            info!(
                "{} frame {}: {} live particles",
                name,
                *frame,
                manager.active_particle_count()
            );
        }
    }
    if *frame >= FRAMES {
        exit.write(AppExit::Success);
    }
}

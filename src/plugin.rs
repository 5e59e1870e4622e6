//! Bevy integration: drives every [`SurfaceParticleManager`] from the app schedules.

use std::path::Path;

use bevy::ecs::component::Mutable;
use bevy::prelude::*;
use bevy_particle_pool::ScalarRange;

use crate::backend::CpuParticleBackend;
use crate::constants::SURFACES_DIR;
use crate::data::*;
use crate::effect::{EffectContext, VehicleEffect};
use crate::manager::SurfaceParticleManager;
use crate::presets;
use crate::vehicle::{SurfaceId, VehicleWheels, WheelId, WheelState, WheelStates};

/// Turn a vehicle's surface particles on or off.
#[derive(Message, Clone, Copy, Debug)]
pub struct SetSurfaceParticlesEnabled {
    pub vehicle: Entity,
    pub enabled: bool,
}

/// System sets, in the order they run within a frame.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceParticleSystems {
    /// Bind new effects to their wheels.
    Initialize,
    /// Apply enable/disable requests.
    Lifecycle,
    /// Per-frame emission.
    Emit,
}

pub struct SurfaceParticlePlugin;

impl Plugin for SurfaceParticlePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SlipCoefficients>()
            .register_type::<SurfaceParticleSettings>()
            .register_type::<SurfaceParticleType>()
            .register_type::<SurfacePreset>()
            .register_type::<ScalarRange>()
            .register_type::<SurfaceId>()
            .register_type::<WheelId>()
            .register_type::<WheelState>()
            .register_type::<WheelStates>()
            .init_resource::<SurfaceMap>()
            .init_resource::<CpuParticleBackend>()
            .add_message::<SetSurfaceParticlesEnabled>()
            .add_systems(PreStartup, load_surface_overrides)
            .configure_sets(
                Update,
                (
                    SurfaceParticleSystems::Initialize,
                    SurfaceParticleSystems::Lifecycle,
                    SurfaceParticleSystems::Emit,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    initialize_effects::<SurfaceParticleManager>
                        .in_set(SurfaceParticleSystems::Initialize),
                    apply_enable_requests.in_set(SurfaceParticleSystems::Lifecycle),
                    update_effects::<SurfaceParticleManager>.in_set(SurfaceParticleSystems::Emit),
                ),
            )
            .add_systems(FixedUpdate, fixed_update_effects::<SurfaceParticleManager>)
            .add_observer(release_effect::<SurfaceParticleManager>);
    }
}

fn load_surface_overrides(mut surfaces: ResMut<SurfaceMap>) {
    presets::load_surfaces_from_disk(Path::new(SURFACES_DIR), &mut surfaces);
}

/// Marks a vehicle whose surface particles were switched on or off before its
/// wheels were known. Initialization then keeps that choice instead of enabling.
#[derive(Component, Debug)]
pub struct LifecycleRequested;

/// Initialize effects once their vehicle reports at least one wheel.
fn initialize_effects<E: VehicleEffect + Component<Mutability = Mutable>>(
    mut backend: ResMut<CpuParticleBackend>,
    surfaces: Res<SurfaceMap>,
    mut vehicles: Query<(Entity, &mut E, &WheelStates, Has<LifecycleRequested>)>,
) {
    for (entity, mut effect, wheels, requested) in &mut vehicles {
        if effect.is_initialized() || wheels.wheel_count() == 0 {
            continue;
        }
        let mut ctx = EffectContext::new(wheels, &mut *backend, &surfaces, 0.0);
        effect.initialize(&mut ctx);
        if !requested {
            effect.enable(&mut *backend);
        }
        debug!("{} ready on {:?}", effect.name(), entity);
    }
}

fn apply_enable_requests(
    mut commands: Commands,
    mut requests: MessageReader<SetSurfaceParticlesEnabled>,
    mut backend: ResMut<CpuParticleBackend>,
    mut managers: Query<&mut SurfaceParticleManager>,
) {
    for request in requests.read() {
        let Ok(mut manager) = managers.get_mut(request.vehicle) else {
            warn!("No surface particle manager on {:?}", request.vehicle);
            continue;
        };
        if !manager.is_initialized() {
            commands.entity(request.vehicle).insert(LifecycleRequested);
        }
        if request.enabled {
            manager.enable(&mut *backend);
        } else {
            manager.disable(&mut *backend);
        }
    }
}

fn update_effects<E: VehicleEffect + Component<Mutability = Mutable>>(
    time: Res<Time>,
    mut backend: ResMut<CpuParticleBackend>,
    surfaces: Res<SurfaceMap>,
    mut vehicles: Query<(&mut E, &WheelStates)>,
) {
    let dt = time.delta_secs();
    for (mut effect, wheels) in &mut vehicles {
        let mut ctx = EffectContext::new(wheels, &mut *backend, &surfaces, dt);
        effect.update(&mut ctx);
    }
}

fn fixed_update_effects<E: VehicleEffect + Component<Mutability = Mutable>>(
    time: Res<Time>,
    mut backend: ResMut<CpuParticleBackend>,
    surfaces: Res<SurfaceMap>,
    mut vehicles: Query<(&mut E, &WheelStates)>,
) {
    let dt = time.delta_secs();
    for (mut effect, wheels) in &mut vehicles {
        let mut ctx = EffectContext::new(wheels, &mut *backend, &surfaces, dt);
        effect.fixed_update(&mut ctx);
    }
}

/// Hand an effect's particle resources back when it is removed or its
/// vehicle despawned.
fn release_effect<E: VehicleEffect + Component<Mutability = Mutable>>(
    remove: On<Remove, E>,
    mut backend: ResMut<CpuParticleBackend>,
    mut effects: Query<&mut E>,
) {
    if let Ok(mut effect) = effects.get_mut(remove.entity) {
        effect.release(&mut *backend);
    }
}

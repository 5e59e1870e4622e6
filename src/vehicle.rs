//! Read-only view of a vehicle's wheels.
//!
//! The vehicle simulation owns wheel kinematics and slip computation. Effects
//! only see a [`WheelState`] per wheel, looked up by [`WheelId`] each frame.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Index of a wheel in its vehicle's wheel list.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect,
)]
pub struct WheelId(pub usize);

/// Identifier of the ground surface a wheel is rolling on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct SurfaceId(pub u32);

/// Per-frame state of one wheel as reported by the vehicle simulation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct WheelState {
    /// Slip along the direction of travel (dimensionless, may be negative).
    pub longitudinal_slip: f32,
    /// Slip perpendicular to the direction of travel (dimensionless, may be negative).
    pub lateral_slip: f32,
    /// Contact patch speed over the ground in m/s.
    pub speed: f32,
    /// Whether the wheel is touching the ground.
    pub grounded: bool,
    /// Surface under the contact patch.
    pub surface: SurfaceId,
}

impl Default for WheelState {
    fn default() -> Self {
        Self {
            longitudinal_slip: 0.0,
            lateral_slip: 0.0,
            speed: 0.0,
            grounded: true,
            surface: SurfaceId::default(),
        }
    }
}

impl WheelState {
    pub fn on(surface: SurfaceId) -> Self {
        Self {
            surface,
            ..default()
        }
    }

    pub fn with_slip(mut self, longitudinal: f32, lateral: f32) -> Self {
        self.longitudinal_slip = longitudinal;
        self.lateral_slip = lateral;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn airborne(mut self) -> Self {
        self.grounded = false;
        self
    }
}

/// Ordered, fixed-size list of wheels belonging to one vehicle.
pub trait VehicleWheels {
    fn wheel_count(&self) -> usize;

    fn wheel(&self, id: WheelId) -> Option<&WheelState>;
}

impl VehicleWheels for [WheelState] {
    fn wheel_count(&self) -> usize {
        self.len()
    }

    fn wheel(&self, id: WheelId) -> Option<&WheelState> {
        self.get(id.0)
    }
}

impl<const N: usize> VehicleWheels for [WheelState; N] {
    fn wheel_count(&self) -> usize {
        N
    }

    fn wheel(&self, id: WheelId) -> Option<&WheelState> {
        self.get(id.0)
    }
}

impl VehicleWheels for Vec<WheelState> {
    fn wheel_count(&self) -> usize {
        self.len()
    }

    fn wheel(&self, id: WheelId) -> Option<&WheelState> {
        self.get(id.0)
    }
}

/// Wheel states of a vehicle entity, written by the vehicle controller
/// before the surface particle systems run.
#[derive(Component, Clone, Debug, Default, PartialEq, Reflect)]
#[reflect(Component, Default)]
pub struct WheelStates(pub Vec<WheelState>);

impl VehicleWheels for WheelStates {
    fn wheel_count(&self) -> usize {
        self.0.len()
    }

    fn wheel(&self, id: WheelId) -> Option<&WheelState> {
        self.0.get(id.0)
    }
}

//! Keyboard fly controls for a scene model.
//!
//! [`Arrows`] moves a model with WASD along its own axes and turns it with
//! the arrow keys:
//!
//! | Keys | Effect | Rate |
//! |------|--------|------|
//! | W / S | pan along -Z / +Z | `speed` units per second |
//! | A / D | pan along -X / +X | `speed` units per second |
//! | Up / Down | pitch +X / -X | `turn_rate` degrees per second |
//! | Left / Right | yaw +Y / -Y | `turn_rate` degrees per second |
//!
//! # Example
//!
//! ```
//! use phanto::{Arrows, Model, Scene};
//! use phanto::input::{Action, Keyboard};
//!
//! let mut scene = Scene::new();
//! let player = scene.spawn(Model::empty()).unwrap();
//! let controls = Arrows::new(player);
//!
//! let mut keyboard = Keyboard::new();
//! keyboard.press(Action::W);
//! controls.update(&mut scene, &keyboard, 500.0).unwrap();
//!
//! assert!((scene.transform(player).unwrap().position.z + 2.5).abs() < 1e-5);
//! ```

use crate::error::SceneError;
use crate::input::{Action, Keyboard};
use crate::scene::{ModelId, Scene};
use crate::transform::Transform;

/// Fly controller bound to one model.
#[derive(Clone, Copy, Debug)]
pub struct Arrows {
    pub model: ModelId,
    /// Pan speed in units per second.
    pub speed: f32,
    /// Turn rate in degrees per second.
    pub turn_rate: f32,
}

impl Arrows {
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            speed: 5.0,
            turn_rate: 360.0,
        }
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn turn_rate(mut self, degrees_per_second: f32) -> Self {
        self.turn_rate = degrees_per_second;
        self
    }

    /// Applies `delta_ms` worth of input to the model and updates its transform.
    pub fn update(&self, scene: &mut Scene, keyboard: &Keyboard, delta_ms: f64) -> Result<(), SceneError> {
        self.apply(scene.transform_mut(self.model)?, keyboard, delta_ms);
        Ok(())
    }

    /// Applies input to a bare transform.
    pub fn apply(&self, transform: &mut Transform, keyboard: &Keyboard, delta_ms: f64) {
        let seconds = (delta_ms / 1000.0) as f32;
        let move_x = keyboard.axis(Action::A, Action::D);
        let move_z = keyboard.axis(Action::W, Action::S);
        let pitch = keyboard.axis(Action::Down, Action::Up);
        let yaw = keyboard.axis(Action::Right, Action::Left);

        transform
            .pan_x(self.speed * move_x * seconds)
            .pan_z(self.speed * move_z * seconds)
            .rotate(
                self.turn_rate * pitch * seconds,
                self.turn_rate * yaw * seconds,
                0.0,
            )
            .update();
    }
}

//! # Phanto
//!
//! **A retained-mode 3D scene graph with declarative GLSL shaders.**
//!
//! Describe shaders as data, place models in a scene, and let the renderer
//! batch the draws. Phanto talks to the GPU through the small
//! [`GraphicsContext`](gl::GraphicsContext) trait, so it runs against a real
//! WebGL2 / GLES 3 binding or against [`RecordingContext`](gl::RecordingContext)
//! in tests.
//!
//! ## Quick Start
//!
//! ```
//! use phanto::*;
//! use phanto::gl::RecordingContext;
//!
//! let mut renderer = Renderer::new(RecordingContext::new(), RendererConfig::default());
//! let mut scene = Scene::new();
//!
//! let camera = scene.spawn_camera(
//!     Camera::perspective(std::f32::consts::FRAC_PI_3, 1.0, 0.01, 1000.0),
//!     Transform::from_position(Vec3::new(0.0, 1.0, 6.0)),
//! );
//! let cube = scene.add_geometry(primitives::cube(1.0, &primitives::CubeFace::ALL));
//! let crate_box = scene
//!     .spawn(Model::new(cube, material::phong(Vec3::new(0.9, 0.6, 0.2), 16.0, Vec3::ONE)))
//!     .unwrap();
//! let sun = scene.spawn_directional_light(DirectionalLight::new(Vec3::ONE), Transform::new());
//!
//! scene
//!     .set_camera(camera)
//!     .unwrap()
//!     .add_item(crate_box)
//!     .unwrap()
//!     .add_directional_light(sun)
//!     .unwrap()
//!     .add_ambient_light(AmbientLight::new(Vec3::ONE, 0.2));
//!
//! let mut frames = FrameLoop::new();
//! frames.start();
//! if let Some(_tick) = frames.tick(0.0) {
//!     scene.update();
//!     renderer.clear();
//!     let stats = renderer.render_scene(&mut scene, false).unwrap();
//!     assert_eq!(stats.draw_calls, 1);
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`shader`]: descriptors, GLSL synthesis, uniform binding tables, the registry.
//! - [`scene`]: models, hierarchy, material groups, lights.
//! - [`Renderer`]: batched drawing by shader with optional uniforms.
//! - [`geometry`] and [`primitives`]: vertex data with explicit GPU realization.
//! - [`material`]: the built-in `basic`, `normal`, `diffuse` and `phong` shaders.

mod camera;
mod controls;
mod error;
mod frame_loop;
pub mod geometry;
pub mod gl;
pub mod input;
mod light;
pub mod logging;
pub mod material;
pub mod math;
pub mod primitives;
mod renderer;
pub mod scene;
pub mod shader;
mod transform;

pub use camera::{Camera, Projection};
pub use controls::Arrows;
pub use error::{RenderError, SceneError, ShaderError};
pub use frame_loop::{FrameLoop, FrameTick};
pub use geometry::{Geometry, GeometryId, RenderInfo};
pub use light::{AmbientLight, DirectionalLight, PointLight};
pub use logging::{LoggingConfig, init_logging};
pub use material::Material;
pub use renderer::{FrameStats, Renderer, RendererConfig};
pub use scene::{Extras, MaterialGroup, Model, ModelId, Renderable, Scene};
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

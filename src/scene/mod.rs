//! The retained scene graph.
//!
//! A [`Scene`] owns its models in a `hecs` world. Every model has a
//! [`Transform`](crate::Transform); drawable models add a [`Renderable`]
//! (geometry plus material), cameras add a [`Camera`](crate::Camera), and
//! lights add a light component. Hierarchy is a single-parent tree: the child
//! stores a non-owning link to its parent and its world matrix is the parent's
//! world matrix times its own local matrix.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use phanto::{AmbientLight, Camera, Model, Scene, Transform, material, primitives};
//!
//! let mut scene = Scene::new();
//! let camera = scene.spawn_camera(
//!     Camera::perspective(std::f32::consts::FRAC_PI_3, 1.0, 0.01, 1000.0),
//!     Transform::from_position(Vec3::new(0.0, 0.0, 5.0)),
//! );
//! let sphere = scene.add_geometry(primitives::sphere(1.0, 16));
//! let ball = scene
//!     .spawn(Model::new(sphere, material::diffuse(Vec3::new(0.8, 0.2, 0.2))))
//!     .unwrap();
//!
//! scene
//!     .set_camera(camera)
//!     .unwrap()
//!     .add_item(ball)
//!     .unwrap()
//!     .add_ambient_light(AmbientLight::new(Vec3::ONE, 0.3));
//!
//! assert_eq!(scene.get_items_by_material()[0].shader, "diffuse");
//! ```

mod model;
mod scene;

pub use model::{Extras, Model, ModelId, Renderable};
pub use scene::{MaterialGroup, Scene};

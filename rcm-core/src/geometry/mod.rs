//! Geometric primitives shared by the camera and refraction code

mod ray;

pub use ray::{compute_refraction, ray_plane_intersection, ray_sphere_intersection, Ray3D};

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// Rigid transform (rotation + translation) between two 3D frames
pub type Rigid3d = Isometry3<f64>;

/// Pure translation that moves `center` to the origin of the new frame
pub fn rigid_from_center(center: &Vector3<f64>) -> Rigid3d {
    Rigid3d::from_parts(Translation3::from(-center), UnitQuaternion::identity())
}

use super::{CameraRefracModelId, RefracModel};
use crate::geometry::{compute_refraction, ray_plane_intersection, Ray3D};
use nalgebra::Vector3;

/// Flat window in front of the camera:
/// `Nx, Ny, Nz, int_dist, int_thick, na, ng, nw`
///
/// `N` is the interface normal, `int_dist` the distance from the camera
/// center to the inner surface and `int_thick` the window thickness. The
/// refractive indices are those of air (inside), glass and water.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatPort;

impl RefracModel for FlatPort {
    fn id(&self) -> CameraRefracModelId {
        CameraRefracModelId::FlatPort
    }

    fn params_info(&self) -> &'static str {
        "Nx, Ny, Nz, int_dist, int_thick, na, ng, nw"
    }

    fn num_params(&self) -> usize {
        8
    }

    fn optimizable_params_idxs(&self) -> &'static [usize] {
        &[0, 1, 2, 3]
    }

    fn refract_ray(&self, refrac_params: &[f64], dir: &Vector3<f64>) -> Ray3D {
        let normal = self.refraction_axis(refrac_params);
        let (int_dist, int_thick) = (refrac_params[3], refrac_params[4]);
        let (na, ng, nw) = (refrac_params[5], refrac_params[6], refrac_params[7]);

        // Inner surface
        let t = ray_plane_intersection(&Vector3::zeros(), dir, &normal, int_dist);
        let ori = dir * t;
        let dir = compute_refraction(&normal, na, ng, dir);

        // Outer surface
        let t = ray_plane_intersection(&ori, &dir, &normal, int_dist + int_thick);
        let ori = ori + dir * t;
        let dir = compute_refraction(&normal, ng, nw, &dir);

        Ray3D { ori, dir }
    }

    fn refraction_axis(&self, refrac_params: &[f64]) -> Vector3<f64> {
        Vector3::new(refrac_params[0], refrac_params[1], refrac_params[2]).normalize()
    }
}

use super::{degenerate_ray, CameraRefracModelId, RefracModel};
use crate::geometry::{compute_refraction, ray_sphere_intersection, Ray3D};
use nalgebra::Vector3;

/// Decentering below this leaves the axis undefined; fall back to the
/// optical axis.
const MIN_DECENTERING: f64 = 1e-12;

/// Spherical dome in front of the camera:
/// `Cx, Cy, Cz, int_radius, int_thick, na, ng, nw`
///
/// `C` is the dome center in the camera frame, `int_radius` the inner
/// radius and `int_thick` the dome thickness. A perfectly centered dome
/// does not bend any ray.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomePort;

impl RefracModel for DomePort {
    fn id(&self) -> CameraRefracModelId {
        CameraRefracModelId::DomePort
    }

    fn params_info(&self) -> &'static str {
        "Cx, Cy, Cz, int_radius, int_thick, na, ng, nw"
    }

    fn num_params(&self) -> usize {
        8
    }

    fn optimizable_params_idxs(&self) -> &'static [usize] {
        &[0, 1, 2]
    }

    fn refract_ray(&self, refrac_params: &[f64], dir: &Vector3<f64>) -> Ray3D {
        let center = Vector3::new(refrac_params[0], refrac_params[1], refrac_params[2]);
        let (int_radius, int_thick) = (refrac_params[3], refrac_params[4]);
        let (na, ng, nw) = (refrac_params[5], refrac_params[6], refrac_params[7]);

        // The camera sits inside the dome, so the far intersection is the exit.
        let Some((_, t)) = ray_sphere_intersection(&Vector3::zeros(), dir, &center, int_radius) else {
            return degenerate_ray();
        };
        let ori = dir * t;
        let normal = (ori - center).normalize();
        let dir = compute_refraction(&normal, na, ng, dir);

        let Some((_, t)) = ray_sphere_intersection(&ori, &dir, &center, int_radius + int_thick) else {
            return degenerate_ray();
        };
        let ori = ori + dir * t;
        let normal = (ori - center).normalize();
        let dir = compute_refraction(&normal, ng, nw, &dir);

        Ray3D { ori, dir }
    }

    fn refraction_axis(&self, refrac_params: &[f64]) -> Vector3<f64> {
        let center = Vector3::new(refrac_params[0], refrac_params[1], refrac_params[2]);
        if center.norm() < MIN_DECENTERING {
            return Vector3::z();
        }
        center.normalize()
    }
}

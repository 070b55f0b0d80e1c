use super::{CameraModel, CameraModelId};
use nalgebra::Vector2;

/// Single focal length with one radial coefficient: `f, cx, cy, k`
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRadial;

/// Single focal length with two radial coefficients: `f, cx, cy, k1, k2`
#[derive(Debug, Clone, Copy, Default)]
pub struct Radial;

impl CameraModel for SimpleRadial {
    fn id(&self) -> CameraModelId {
        CameraModelId::SimpleRadial
    }

    fn params_info(&self) -> &'static str {
        "f, cx, cy, k"
    }

    fn focal_length_idxs(&self) -> &'static [usize] {
        &[0]
    }

    fn principal_point_idxs(&self) -> &'static [usize] {
        &[1, 2]
    }

    fn extra_params_idxs(&self) -> &'static [usize] {
        &[3]
    }

    fn distort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        let k = params[3];
        let r2 = point.norm_squared();
        point * (1.0 + k * r2)
    }
}

impl CameraModel for Radial {
    fn id(&self) -> CameraModelId {
        CameraModelId::Radial
    }

    fn params_info(&self) -> &'static str {
        "f, cx, cy, k1, k2"
    }

    fn focal_length_idxs(&self) -> &'static [usize] {
        &[0]
    }

    fn principal_point_idxs(&self) -> &'static [usize] {
        &[1, 2]
    }

    fn extra_params_idxs(&self) -> &'static [usize] {
        &[3, 4]
    }

    fn distort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        let (k1, k2) = (params[3], params[4]);
        let r2 = point.norm_squared();
        point * (1.0 + k1 * r2 + k2 * r2 * r2)
    }
}

use super::{CameraModel, CameraModelId};
use nalgebra::Vector2;

/// Below this radius the equidistant mapping is the identity.
const MIN_RADIUS: f64 = f64::EPSILON;

/// Equidistant fisheye with four coefficients: `fx, fy, cx, cy, k1, k2, k3, k4`
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvFisheye;

/// Equidistant fisheye with one coefficient: `f, cx, cy, k`
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRadialFisheye;

/// Equidistant fisheye with two coefficients: `f, cx, cy, k1, k2`
#[derive(Debug, Clone, Copy, Default)]
pub struct RadialFisheye;

/// Scale normalized coordinates by `theta_d / r` with
/// `theta_d = theta * (1 + k1 theta^2 + k2 theta^4 + ...)`.
fn equidistant(coeffs: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
    let r = point.norm();
    if r < MIN_RADIUS {
        return *point;
    }

    let theta = r.atan();
    let theta2 = theta * theta;
    let mut theta_pow = theta2;
    let mut poly = 1.0;
    for k in coeffs {
        poly += k * theta_pow;
        theta_pow *= theta2;
    }

    point * (theta * poly / r)
}

impl CameraModel for OpenCvFisheye {
    fn id(&self) -> CameraModelId {
        CameraModelId::OpenCvFisheye
    }

    fn params_info(&self) -> &'static str {
        "fx, fy, cx, cy, k1, k2, k3, k4"
    }

    fn focal_length_idxs(&self) -> &'static [usize] {
        &[0, 1]
    }

    fn principal_point_idxs(&self) -> &'static [usize] {
        &[2, 3]
    }

    fn extra_params_idxs(&self) -> &'static [usize] {
        &[4, 5, 6, 7]
    }

    fn distort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        equidistant(&params[4..8], point)
    }
}

impl CameraModel for SimpleRadialFisheye {
    fn id(&self) -> CameraModelId {
        CameraModelId::SimpleRadialFisheye
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
        equidistant(&params[3..4], point)
    }
}

impl CameraModel for RadialFisheye {
    fn id(&self) -> CameraModelId {
        CameraModelId::RadialFisheye
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
        equidistant(&params[3..5], point)
    }
}

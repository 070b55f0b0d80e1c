use super::{CameraModel, CameraModelId};
use nalgebra::Vector2;

/// Brown-Conrady distortion with two radial and two tangential terms:
/// `fx, fy, cx, cy, k1, k2, p1, p2`
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCv;

/// Rational radial model with tangential terms:
/// `fx, fy, cx, cy, k1, k2, p1, p2, k3, k4, k5, k6`
#[derive(Debug, Clone, Copy, Default)]
pub struct FullOpenCv;

/// Tangential part shared by both families
fn tangential(p1: f64, p2: f64, x: f64, y: f64, r2: f64) -> Vector2<f64> {
    Vector2::new(
        2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x),
        p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y,
    )
}

impl CameraModel for OpenCv {
    fn id(&self) -> CameraModelId {
        CameraModelId::OpenCv
    }

    fn params_info(&self) -> &'static str {
        "fx, fy, cx, cy, k1, k2, p1, p2"
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
        let (k1, k2, p1, p2) = (params[4], params[5], params[6], params[7]);
        let r2 = point.norm_squared();
        let radial = 1.0 + k1 * r2 + k2 * r2 * r2;
        point * radial + tangential(p1, p2, point.x, point.y, r2)
    }
}

impl CameraModel for FullOpenCv {
    fn id(&self) -> CameraModelId {
        CameraModelId::FullOpenCv
    }

    fn params_info(&self) -> &'static str {
        "fx, fy, cx, cy, k1, k2, p1, p2, k3, k4, k5, k6"
    }

    fn focal_length_idxs(&self) -> &'static [usize] {
        &[0, 1]
    }

    fn principal_point_idxs(&self) -> &'static [usize] {
        &[2, 3]
    }

    fn extra_params_idxs(&self) -> &'static [usize] {
        &[4, 5, 6, 7, 8, 9, 10, 11]
    }

    fn distort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        let (k1, k2, p1, p2) = (params[4], params[5], params[6], params[7]);
        let (k3, k4, k5, k6) = (params[8], params[9], params[10], params[11]);

        let r2 = point.norm_squared();
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        let radial = (1.0 + k1 * r2 + k2 * r4 + k3 * r6) / (1.0 + k4 * r2 + k5 * r4 + k6 * r6);

        point * radial + tangential(p1, p2, point.x, point.y, r2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_opencv_round_trip() {
        let params = [1000.0, 1000.0, 960.0, 540.0, -0.1, 0.05, 0.001, -0.001];
        let point = Vector3::new(0.5, 0.3, 1.0);
        let pixel = OpenCv.img_from_cam(&params, &point);
        assert!(pixel.x > 0.0 && pixel.x < 1920.0);
        assert!(pixel.y > 0.0 && pixel.y < 1080.0);

        let back = OpenCv.cam_from_img(&params, &pixel);
        assert!((back.x - 0.5).abs() < 1e-8);
        assert!((back.y - 0.3).abs() < 1e-8);
    }

    #[test]
    fn test_full_opencv_reduces_to_opencv() {
        let opencv = [800.0, 810.0, 400.0, 300.0, -0.2, 0.03, 0.002, 0.001];
        let mut full = [0.0; 12];
        full[..8].copy_from_slice(&opencv);

        let point = Vector2::new(0.25, -0.35);
        let a = OpenCv.distort(&opencv, &point);
        let b = FullOpenCv.distort(&full, &point);
        assert!((a - b).norm() < 1e-15);
    }
}

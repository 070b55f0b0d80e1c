use super::{CameraModel, CameraModelId};
use nalgebra::{Vector2, Vector3};

/// Pinhole camera with a single focal length: `f, cx, cy`
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePinhole;

/// Pinhole camera with separate focal lengths: `fx, fy, cx, cy`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pinhole;

impl CameraModel for SimplePinhole {
    fn id(&self) -> CameraModelId {
        CameraModelId::SimplePinhole
    }

    fn params_info(&self) -> &'static str {
        "f, cx, cy"
    }

    fn focal_length_idxs(&self) -> &'static [usize] {
        &[0]
    }

    fn principal_point_idxs(&self) -> &'static [usize] {
        &[1, 2]
    }

    fn extra_params_idxs(&self) -> &'static [usize] {
        &[]
    }

    fn distort(&self, _params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        *point
    }

    fn undistort(&self, _params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        *point
    }

    fn img_from_cam(&self, params: &[f64], cam_point: &Vector3<f64>) -> Vector2<f64> {
        let (f, cx, cy) = (params[0], params[1], params[2]);
        Vector2::new(
            f * cam_point.x / cam_point.z + cx,
            f * cam_point.y / cam_point.z + cy,
        )
    }

    fn cam_from_img(&self, params: &[f64], image_point: &Vector2<f64>) -> Vector3<f64> {
        let (f, cx, cy) = (params[0], params[1], params[2]);
        Vector3::new((image_point.x - cx) / f, (image_point.y - cy) / f, 1.0)
    }
}

impl CameraModel for Pinhole {
    fn id(&self) -> CameraModelId {
        CameraModelId::Pinhole
    }

    fn params_info(&self) -> &'static str {
        "fx, fy, cx, cy"
    }

    fn focal_length_idxs(&self) -> &'static [usize] {
        &[0, 1]
    }

    fn principal_point_idxs(&self) -> &'static [usize] {
        &[2, 3]
    }

    fn extra_params_idxs(&self) -> &'static [usize] {
        &[]
    }

    fn distort(&self, _params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        *point
    }

    fn undistort(&self, _params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        *point
    }

    fn img_from_cam(&self, params: &[f64], cam_point: &Vector3<f64>) -> Vector2<f64> {
        let (fx, fy, cx, cy) = (params[0], params[1], params[2], params[3]);
        Vector2::new(
            fx * cam_point.x / cam_point.z + cx,
            fy * cam_point.y / cam_point.z + cy,
        )
    }

    fn cam_from_img(&self, params: &[f64], image_point: &Vector2<f64>) -> Vector3<f64> {
        let (fx, fy, cx, cy) = (params[0], params[1], params[2], params[3]);
        Vector3::new((image_point.x - cx) / fx, (image_point.y - cy) / fy, 1.0)
    }
}

//! Per-observation pinhole approximation of refractive cameras
//!
//! For one observed pixel the refracted ray is traced into the scene and its
//! crossing with the refraction axis becomes the center of a virtual
//! pinhole camera. Seen from there, every point on the refracted ray lies
//! on a straight line through the virtual center, so ordinary perspective
//! projection reproduces the observation exactly at that pixel. Algorithms
//! unaware of refraction (e.g. bundle adjustment) can then work with the
//! virtual camera and the `virtual_from_real` transform.

use super::{Camera, INVALID_CAMERA_ID};
use crate::geometry::{rigid_from_center, Ray3D, Rigid3d};
use crate::models::CameraModelId;
use crate::refrac::RefracModel;
use log::debug;
use nalgebra::{Point3, Vector2, Vector3};
use rayon::prelude::*;

impl Camera {
    /// Refraction axis of the interface, `None` if the camera is not
    /// refractive
    pub fn refraction_axis(&self) -> Option<Vector3<f64>> {
        let refrac_model = self.refrac_model_id.model()?;
        Some(refrac_model.refraction_axis(&self.refrac_params))
    }

    /// Point on the refraction axis closest to the refracted ray.
    ///
    /// A ray parallel to the axis yields the real camera center.
    pub fn virtual_camera_center(&self, ray_refrac: &Ray3D) -> Option<Vector3<f64>> {
        let axis = self.refraction_axis()?;
        Some(center_on_axis(&axis, ray_refrac))
    }

    /// Pinhole camera with the focal lengths of this camera whose principal
    /// point makes `cam_point` (normalized, in the virtual frame) project
    /// onto `image_point`.
    pub fn virtual_camera(&self, image_point: &Vector2<f64>, cam_point: &Vector2<f64>) -> Camera {
        let fx = self.focal_length_x();
        let fy = self.focal_length_y();

        let mut virtual_camera = Camera::create_from_model_id(
            INVALID_CAMERA_ID,
            CameraModelId::Pinhole,
            fx,
            self.width,
            self.height,
        );
        virtual_camera.set_focal_length_y(fy);
        virtual_camera.set_principal_point_x(image_point.x - fx * cam_point.x);
        virtual_camera.set_principal_point_y(image_point.y - fy * cam_point.y);
        virtual_camera
    }

    /// Virtual pinhole camera and real-to-virtual transform for one
    /// observation. `None` if the camera is not refractive.
    pub fn compute_virtual(&self, point2d: &Vector2<f64>) -> Option<(Camera, Rigid3d)> {
        let refrac_model = self.refrac_model_id.model()?;
        Some(self.synthesize_virtual(refrac_model, point2d))
    }

    /// Batched [`Camera::compute_virtual`], one output per input point in
    /// input order
    pub fn compute_virtuals(&self, points2d: &[Vector2<f64>]) -> Option<(Vec<Camera>, Vec<Rigid3d>)> {
        let refrac_model = self.refrac_model_id.model()?;
        debug!(
            "synthesizing {} virtual cameras for camera {}",
            points2d.len(),
            self.camera_id
        );
        Some(
            points2d
                .iter()
                .map(|point2d| self.synthesize_virtual(refrac_model, point2d))
                .unzip(),
        )
    }

    /// Parallel version of [`Camera::compute_virtuals`] with identical output
    pub fn compute_virtuals_par(
        &self,
        points2d: &[Vector2<f64>],
    ) -> Option<(Vec<Camera>, Vec<Rigid3d>)> {
        let refrac_model = self.refrac_model_id.model()?;
        debug!(
            "synthesizing {} virtual cameras in parallel for camera {}",
            points2d.len(),
            self.camera_id
        );
        Some(
            points2d
                .par_iter()
                .map(|point2d| self.synthesize_virtual(refrac_model, point2d))
                .unzip(),
        )
    }

    fn synthesize_virtual(&self, refrac_model: &dyn RefracModel, point2d: &Vector2<f64>) -> (Camera, Rigid3d) {
        let ray_refrac = self.cam_from_img_refrac(point2d);
        let axis = refrac_model.refraction_axis(&self.refrac_params);
        let center = center_on_axis(&axis, &ray_refrac);

        let virtual_from_real = rigid_from_center(&center);
        let point_virtual = virtual_from_real.transform_point(&Point3::from(ray_refrac.at(1.0)));
        let cam_point = point_virtual.coords.xy() / point_virtual.z;

        (self.virtual_camera(point2d, &cam_point), virtual_from_real)
    }
}

fn center_on_axis(axis: &Vector3<f64>, ray_refrac: &Ray3D) -> Vector3<f64> {
    ray_refrac
        .closest_point_on_line(&Vector3::zeros(), axis)
        .unwrap_or_else(Vector3::zeros)
}

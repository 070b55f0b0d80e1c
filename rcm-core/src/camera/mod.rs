//! Camera intrinsics container and projection facade
//!
//! [`Camera`] stores the parameters of one physical (or virtual) camera and
//! forwards every model-dependent operation to the registry entries selected
//! by its `model_id` and `refrac_model_id`.
//!
//! Operations other than [`Camera::verify_params`] and
//! [`Camera::verify_refrac_params`] assume that the parameter vectors match
//! the bound models. Calling a model-dependent operation on a camera without
//! a bound model panics.

mod options;
mod virtual_camera;

pub use options::BogusParamsOptions;

use crate::error::{ParamsError, Result};
use crate::geometry::Ray3D;
use crate::models::{CameraModel, CameraModelId};
use crate::refrac::{self, CameraRefracModelId, RefracModel};
use log::debug;
use nalgebra::{Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

pub type CameraId = u32;

/// Marks a camera that has not been assigned an identifier
pub const INVALID_CAMERA_ID: CameraId = CameraId::MAX;

/// Intrinsic parameters of a camera, optionally behind a refractive interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub camera_id: CameraId,
    pub model_id: CameraModelId,
    pub refrac_model_id: CameraRefracModelId,
    /// Image dimensions, 0 if unknown
    pub width: usize,
    pub height: usize,
    /// Focal length, principal point and extra parameters
    pub params: Vec<f64>,
    /// Refractive interface parameters, empty if not refractive
    pub refrac_params: Vec<f64>,
    /// Focal length comes from a trusted source such as EXIF
    pub has_prior_focal_length: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            camera_id: INVALID_CAMERA_ID,
            model_id: CameraModelId::Invalid,
            refrac_model_id: CameraRefracModelId::Invalid,
            width: 0,
            height: 0,
            params: Vec::new(),
            refrac_params: Vec::new(),
            has_prior_focal_length: false,
        }
    }
}

impl Camera {
    /// Create a camera with all focal lengths set to `focal_length`, the
    /// principal point at the image center and zero distortion.
    ///
    /// # Panics
    /// If `model_id` is [`CameraModelId::Invalid`].
    pub fn create_from_model_id(
        camera_id: CameraId,
        model_id: CameraModelId,
        focal_length: f64,
        width: usize,
        height: usize,
    ) -> Self {
        let mut camera = Self {
            camera_id,
            model_id,
            width,
            height,
            ..Self::default()
        };

        let model = camera.model();
        camera.params = vec![0.0; model.num_params()];
        camera.set_focal_length(focal_length);
        camera.set_principal_point_x(width as f64 / 2.0);
        camera.set_principal_point_y(height as f64 / 2.0);
        camera
    }

    /// Same as [`Camera::create_from_model_id`], selecting the model by name
    pub fn create_from_model_name(
        camera_id: CameraId,
        model_name: &str,
        focal_length: f64,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let model_id = model_name.parse::<CameraModelId>()?;
        Ok(Self::create_from_model_id(
            camera_id,
            model_id,
            focal_length,
            width,
            height,
        ))
    }

    fn model(&self) -> &'static dyn CameraModel {
        match self.model_id.model() {
            Some(model) => model,
            None => panic!("camera {} has no camera model", self.camera_id),
        }
    }

    fn refrac_model(&self) -> &'static dyn RefracModel {
        match self.refrac_model_id.model() {
            Some(model) => model,
            None => panic!("camera {} is not refractive", self.camera_id),
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.model_id.name()
    }

    pub fn refrac_model_name(&self) -> &'static str {
        self.refrac_model_id.name()
    }

    pub fn mean_focal_length(&self) -> f64 {
        let idxs = self.focal_length_idxs();
        idxs.iter().map(|&idx| self.params[idx]).sum::<f64>() / idxs.len() as f64
    }

    /// Focal length of models with a single focal length parameter
    pub fn focal_length(&self) -> f64 {
        let idxs = self.focal_length_idxs();
        debug_assert_eq!(idxs.len(), 1);
        self.params[idxs[0]]
    }

    pub fn focal_length_x(&self) -> f64 {
        self.params[self.focal_length_idxs()[0]]
    }

    /// Falls back to the only focal length of isotropic models
    pub fn focal_length_y(&self) -> f64 {
        let idxs = self.focal_length_idxs();
        self.params[idxs[if idxs.len() == 1 { 0 } else { 1 }]]
    }

    /// Set every focal length parameter to `f`
    pub fn set_focal_length(&mut self, f: f64) {
        for &idx in self.focal_length_idxs() {
            self.params[idx] = f;
        }
    }

    pub fn set_focal_length_x(&mut self, fx: f64) {
        let idxs = self.focal_length_idxs();
        debug_assert_eq!(idxs.len(), 2);
        self.params[idxs[0]] = fx;
    }

    pub fn set_focal_length_y(&mut self, fy: f64) {
        let idxs = self.focal_length_idxs();
        debug_assert_eq!(idxs.len(), 2);
        self.params[idxs[1]] = fy;
    }

    pub fn principal_point_x(&self) -> f64 {
        let idxs = self.principal_point_idxs();
        debug_assert_eq!(idxs.len(), 2);
        self.params[idxs[0]]
    }

    pub fn principal_point_y(&self) -> f64 {
        let idxs = self.principal_point_idxs();
        debug_assert_eq!(idxs.len(), 2);
        self.params[idxs[1]]
    }

    pub fn set_principal_point_x(&mut self, cx: f64) {
        let idxs = self.principal_point_idxs();
        debug_assert_eq!(idxs.len(), 2);
        self.params[idxs[0]] = cx;
    }

    pub fn set_principal_point_y(&mut self, cy: f64) {
        let idxs = self.principal_point_idxs();
        debug_assert_eq!(idxs.len(), 2);
        self.params[idxs[1]] = cy;
    }

    pub fn focal_length_idxs(&self) -> &'static [usize] {
        self.model().focal_length_idxs()
    }

    pub fn principal_point_idxs(&self) -> &'static [usize] {
        self.model().principal_point_idxs()
    }

    pub fn extra_params_idxs(&self) -> &'static [usize] {
        self.model().extra_params_idxs()
    }

    /// Refractive parameters describing the interface pose
    pub fn optimizable_refrac_params_idxs(&self) -> &'static [usize] {
        self.refrac_model().optimizable_params_idxs()
    }

    /// `K = [[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`, without distortion
    pub fn calibration_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.focal_length_x(),
            0.0,
            self.principal_point_x(),
            0.0,
            self.focal_length_y(),
            self.principal_point_y(),
            0.0,
            0.0,
            1.0,
        )
    }

    pub fn params_info(&self) -> &'static str {
        self.model().params_info()
    }

    pub fn refrac_params_info(&self) -> &'static str {
        self.refrac_model().params_info()
    }

    /// Comma-separated parameter list, e.g. `"500, 320, 240"`
    pub fn params_to_string(&self) -> String {
        join_params(&self.params)
    }

    pub fn refrac_params_to_string(&self) -> String {
        join_params(&self.refrac_params)
    }

    /// Parse a comma-separated parameter list for the bound model.
    ///
    /// On error the current parameters are left untouched.
    pub fn set_params_from_string(&mut self, string: &str) -> std::result::Result<(), ParamsError> {
        let model = self.model_id.model().ok_or(ParamsError::NoModel)?;
        let params = parse_params(string, model.num_params()).inspect_err(|err| {
            debug!("rejected params {string:?} for camera {}: {err}", self.camera_id);
        })?;
        self.params = params;
        Ok(())
    }

    /// Parse a comma-separated refractive parameter list for the bound
    /// refractive model.
    pub fn set_refrac_params_from_string(
        &mut self,
        string: &str,
    ) -> std::result::Result<(), ParamsError> {
        let refrac_model = self.refrac_model_id.model().ok_or(ParamsError::NoModel)?;
        let refrac_params =
            parse_params(string, refrac_model.num_params()).inspect_err(|err| {
                debug!("rejected refractive params {string:?} for camera {}: {err}", self.camera_id);
            })?;
        self.refrac_params = refrac_params;
        Ok(())
    }

    /// Parameter count matches the bound model; false without a model
    pub fn verify_params(&self) -> bool {
        self.model_id
            .model()
            .is_some_and(|model| model.verify_params(&self.params))
    }

    /// Refractive parameter count matches the bound refractive model. A
    /// non-refractive camera must have no refractive parameters.
    pub fn verify_refrac_params(&self) -> bool {
        match self.refrac_model_id.model() {
            Some(refrac_model) => refrac_model.verify_params(&self.refrac_params),
            None => self.refrac_params.is_empty(),
        }
    }

    pub fn is_undistorted(&self) -> bool {
        self.model().is_undistorted(&self.params)
    }

    pub fn is_camera_refractive(&self) -> bool {
        self.refrac_model_id.is_valid()
    }

    pub fn has_bogus_params(
        &self,
        min_focal_length_ratio: f64,
        max_focal_length_ratio: f64,
        max_extra_param: f64,
    ) -> bool {
        self.model().has_bogus_params(
            &self.params,
            self.width,
            self.height,
            min_focal_length_ratio,
            max_focal_length_ratio,
            max_extra_param,
        )
    }

    pub fn has_bogus_params_with(&self, options: &BogusParamsOptions) -> bool {
        self.has_bogus_params(
            options.min_focal_length_ratio,
            options.max_focal_length_ratio,
            options.max_extra_param,
        )
    }

    /// Back-project an image point onto the normalized image plane `z = 1`
    pub fn cam_from_img(&self, image_point: &Vector2<f64>) -> Vector2<f64> {
        let cam_point = self.model().cam_from_img(&self.params, image_point);
        cam_point.xy() / cam_point.z
    }

    /// Convert a pixel threshold to the normalized camera frame
    pub fn cam_from_img_threshold(&self, threshold: f64) -> f64 {
        self.model().cam_from_img_threshold(&self.params, threshold)
    }

    /// Project a point on the normalized image plane to image coordinates
    pub fn img_from_cam(&self, cam_point: &Vector2<f64>) -> Vector2<f64> {
        self.model()
            .img_from_cam(&self.params, &cam_point.push(1.0))
    }

    /// Project a camera-frame point, `None` if it lies at or behind the
    /// image plane
    pub fn project(&self, point_camera: &Vector3<f64>) -> Option<Vector2<f64>> {
        if point_camera.z <= 0.0 {
            return None;
        }
        Some(self.model().img_from_cam(&self.params, point_camera))
    }

    /// Back-project an image point to the refracted ray in the camera frame.
    ///
    /// Total internal reflection is not handled: the ray then consists of
    /// NaN values.
    pub fn cam_from_img_refrac(&self, image_point: &Vector2<f64>) -> Ray3D {
        refrac::cam_from_img(
            self.model(),
            self.refrac_model(),
            &self.params,
            &self.refrac_params,
            image_point,
        )
    }

    /// Back-project an image point to the point on its refracted ray at the
    /// given depth (camera-frame z coordinate).
    pub fn cam_from_img_refrac_point(&self, image_point: &Vector2<f64>, depth: f64) -> Vector3<f64> {
        refrac::cam_from_img_point(
            self.model(),
            self.refrac_model(),
            &self.params,
            &self.refrac_params,
            image_point,
            depth,
        )
    }

    /// Project a camera-frame point through the refractive interface.
    ///
    /// Total internal reflection is not handled: the result is then NaN.
    pub fn img_from_cam_refrac(&self, cam_point: &Vector3<f64>) -> Vector2<f64> {
        refrac::img_from_cam(
            self.model(),
            self.refrac_model(),
            &self.params,
            &self.refrac_params,
            cam_point,
        )
    }

    /// Scale the image dimensions and accordingly the focal length and
    /// principal point. Extra parameters are left unchanged.
    pub fn rescale(&mut self, scale: f64) {
        debug_assert!(scale > 0.0);
        let new_width = (scale * self.width as f64).round() as usize;
        let new_height = (scale * self.height as f64).round() as usize;
        let scale_x = axis_scale(self.width, new_width, scale);
        let scale_y = axis_scale(self.height, new_height, scale);
        self.apply_rescale(new_width, new_height, scale_x, scale_y);
    }

    /// Rescale to the given image dimensions
    pub fn rescale_to(&mut self, new_width: usize, new_height: usize) {
        let scale_x = axis_scale(self.width, new_width, 1.0);
        let scale_y = axis_scale(self.height, new_height, 1.0);
        self.apply_rescale(new_width, new_height, scale_x, scale_y);
    }

    fn apply_rescale(&mut self, new_width: usize, new_height: usize, scale_x: f64, scale_y: f64) {
        self.width = new_width;
        self.height = new_height;

        self.set_principal_point_x(scale_x * self.principal_point_x());
        self.set_principal_point_y(scale_y * self.principal_point_y());

        if self.focal_length_idxs().len() == 1 {
            let f = self.focal_length();
            self.set_focal_length((scale_x + scale_y) / 2.0 * f);
        } else {
            let (fx, fy) = (self.focal_length_x(), self.focal_length_y());
            self.set_focal_length_x(scale_x * fx);
            self.set_focal_length_y(scale_y * fy);
        }
    }
}

/// Ratio between the new and old size along one axis; `fallback` if the old
/// size is unknown.
fn axis_scale(old_size: usize, new_size: usize, fallback: f64) -> f64 {
    if old_size == 0 {
        fallback
    } else {
        new_size as f64 / old_size as f64
    }
}

fn join_params(params: &[f64]) -> String {
    params
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_params(string: &str, expected: usize) -> std::result::Result<Vec<f64>, ParamsError> {
    let params = if string.trim().is_empty() {
        Vec::new()
    } else {
        string
            .split(',')
            .map(|token| {
                let token = token.trim();
                token
                    .parse::<f64>()
                    .map_err(|_| ParamsError::InvalidValue(token.to_string()))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?
    };

    if params.len() != expected {
        return Err(ParamsError::CountMismatch {
            expected,
            actual: params.len(),
        });
    }
    Ok(params)
}

impl From<CameraModelId> for Camera {
    /// Unassigned camera of the given model with unit focal length and
    /// unknown image size
    fn from(model_id: CameraModelId) -> Self {
        Self::create_from_model_id(INVALID_CAMERA_ID, model_id, 1.0, 0, 0)
    }
}

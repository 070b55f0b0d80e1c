//! Registry of intrinsic camera model families
//!
//! Every family is a zero-sized type implementing [`CameraModel`] and is
//! reachable through its [`CameraModelId`]. Parameter vectors are plain
//! slices whose layout is described by the index groups of the family.
//!
//! Projection maps a camera-frame point to the image by normalizing it onto
//! the plane `z = 1`, applying the family's distortion and finally the
//! focal length / principal point mapping. Back-projection inverts these
//! steps and returns a homogeneous point `(x, y, 1)`.

mod fisheye;
mod fov;
mod opencv;
mod pinhole;
mod radial;
mod undistort;

pub use fisheye::{OpenCvFisheye, RadialFisheye, SimpleRadialFisheye};
pub use fov::Fov;
pub use opencv::{FullOpenCv, OpenCv};
pub use pinhole::{Pinhole, SimplePinhole};
pub use radial::{Radial, SimpleRadial};

pub(crate) use undistort::iterative_undistortion;

use crate::error::RcmError;
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extra parameters below this magnitude count as zero distortion.
const UNDISTORTED_EPS: f64 = 1e-8;

/// Identifier of an intrinsic camera model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum CameraModelId {
    #[default]
    #[serde(rename = "INVALID")]
    Invalid = -1,
    #[serde(rename = "SIMPLE_PINHOLE")]
    SimplePinhole = 0,
    #[serde(rename = "PINHOLE")]
    Pinhole = 1,
    #[serde(rename = "SIMPLE_RADIAL")]
    SimpleRadial = 2,
    #[serde(rename = "RADIAL")]
    Radial = 3,
    #[serde(rename = "OPENCV")]
    OpenCv = 4,
    #[serde(rename = "OPENCV_FISHEYE")]
    OpenCvFisheye = 5,
    #[serde(rename = "FULL_OPENCV")]
    FullOpenCv = 6,
    #[serde(rename = "FOV")]
    Fov = 7,
    #[serde(rename = "SIMPLE_RADIAL_FISHEYE")]
    SimpleRadialFisheye = 8,
    #[serde(rename = "RADIAL_FISHEYE")]
    RadialFisheye = 9,
}

/// Registered families, indexed by their numeric identifier.
static CAMERA_MODELS: [&dyn CameraModel; 10] = [
    &SimplePinhole,
    &Pinhole,
    &SimpleRadial,
    &Radial,
    &OpenCv,
    &OpenCvFisheye,
    &FullOpenCv,
    &Fov,
    &SimpleRadialFisheye,
    &RadialFisheye,
];

impl CameraModelId {
    /// All valid identifiers in registry order
    pub const ALL: [CameraModelId; 10] = [
        CameraModelId::SimplePinhole,
        CameraModelId::Pinhole,
        CameraModelId::SimpleRadial,
        CameraModelId::Radial,
        CameraModelId::OpenCv,
        CameraModelId::OpenCvFisheye,
        CameraModelId::FullOpenCv,
        CameraModelId::Fov,
        CameraModelId::SimpleRadialFisheye,
        CameraModelId::RadialFisheye,
    ];

    /// Canonical upper-case name, e.g. `"SIMPLE_RADIAL"`
    pub fn name(self) -> &'static str {
        match self {
            CameraModelId::Invalid => "INVALID",
            CameraModelId::SimplePinhole => "SIMPLE_PINHOLE",
            CameraModelId::Pinhole => "PINHOLE",
            CameraModelId::SimpleRadial => "SIMPLE_RADIAL",
            CameraModelId::Radial => "RADIAL",
            CameraModelId::OpenCv => "OPENCV",
            CameraModelId::OpenCvFisheye => "OPENCV_FISHEYE",
            CameraModelId::FullOpenCv => "FULL_OPENCV",
            CameraModelId::Fov => "FOV",
            CameraModelId::SimpleRadialFisheye => "SIMPLE_RADIAL_FISHEYE",
            CameraModelId::RadialFisheye => "RADIAL_FISHEYE",
        }
    }

    /// Look up an identifier by its numeric value
    pub fn from_i32(id: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|model_id| *model_id as i32 == id)
    }

    pub fn is_valid(self) -> bool {
        self != CameraModelId::Invalid
    }

    /// Registry entry for this identifier, `None` for [`CameraModelId::Invalid`]
    pub fn model(self) -> Option<&'static dyn CameraModel> {
        match self {
            CameraModelId::Invalid => None,
            id => Some(CAMERA_MODELS[id as usize]),
        }
    }
}

impl fmt::Display for CameraModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CameraModelId {
    type Err = RcmError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name() == name)
            .ok_or_else(|| RcmError::UnknownModel(name.to_string()))
    }
}

/// Per-family contract of an intrinsic camera model
///
/// Implementors describe their parameter layout and the distortion applied
/// to normalized image coordinates; projection, back-projection and the
/// parameter checks are derived from that. Families with a closed-form
/// inverse override [`CameraModel::undistort`].
pub trait CameraModel: Send + Sync {
    fn id(&self) -> CameraModelId;

    /// Human-readable parameter ordering, e.g. `"f, cx, cy, k"`
    fn params_info(&self) -> &'static str;

    fn focal_length_idxs(&self) -> &'static [usize];

    fn principal_point_idxs(&self) -> &'static [usize];

    fn extra_params_idxs(&self) -> &'static [usize];

    /// Map undistorted normalized coordinates to distorted ones
    fn distort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64>;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    fn num_params(&self) -> usize {
        self.focal_length_idxs().len()
            + self.principal_point_idxs().len()
            + self.extra_params_idxs().len()
    }

    /// Inverse of [`CameraModel::distort`]
    fn undistort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        iterative_undistortion(|p| self.distort(params, p), point)
    }

    /// Project a camera-frame point to image coordinates
    fn img_from_cam(&self, params: &[f64], cam_point: &Vector3<f64>) -> Vector2<f64> {
        let (fx, fy) = focal_lengths(self, params);
        let (cx, cy) = principal_point(self, params);

        let normalized = cam_point.xy() / cam_point.z;
        let distorted = self.distort(params, &normalized);

        Vector2::new(fx * distorted.x + cx, fy * distorted.y + cy)
    }

    /// Back-project image coordinates to a homogeneous camera-frame point
    fn cam_from_img(&self, params: &[f64], image_point: &Vector2<f64>) -> Vector3<f64> {
        let (fx, fy) = focal_lengths(self, params);
        let (cx, cy) = principal_point(self, params);

        let distorted = Vector2::new((image_point.x - cx) / fx, (image_point.y - cy) / fy);
        self.undistort(params, &distorted).push(1.0)
    }

    /// Convert a pixel threshold to the normalized camera frame
    fn cam_from_img_threshold(&self, params: &[f64], threshold: f64) -> f64 {
        let idxs = self.focal_length_idxs();
        let mean_focal_length = idxs.iter().map(|&idx| params[idx]).sum::<f64>() / idxs.len() as f64;
        threshold / mean_focal_length
    }

    /// Structural check: the parameter count matches the family
    fn verify_params(&self, params: &[f64]) -> bool {
        params.len() == self.num_params()
    }

    /// Heuristic check for implausible intrinsics
    fn has_bogus_params(
        &self,
        params: &[f64],
        width: usize,
        height: usize,
        min_focal_length_ratio: f64,
        max_focal_length_ratio: f64,
        max_extra_param: f64,
    ) -> bool {
        has_bogus_principal_point(self, params, width, height)
            || has_bogus_focal_length(
                self,
                params,
                width,
                height,
                min_focal_length_ratio,
                max_focal_length_ratio,
            )
            || has_bogus_extra_params(self, params, max_extra_param)
    }

    /// True if every extra parameter is (numerically) zero
    fn is_undistorted(&self, params: &[f64]) -> bool {
        self.extra_params_idxs()
            .iter()
            .all(|&idx| params[idx].abs() < UNDISTORTED_EPS)
    }
}

/// `(fx, fy)`; isotropic families return the same value twice.
fn focal_lengths<M: CameraModel + ?Sized>(model: &M, params: &[f64]) -> (f64, f64) {
    let idxs = model.focal_length_idxs();
    (params[idxs[0]], params[idxs[idxs.len() - 1]])
}

fn principal_point<M: CameraModel + ?Sized>(model: &M, params: &[f64]) -> (f64, f64) {
    let idxs = model.principal_point_idxs();
    (params[idxs[0]], params[idxs[1]])
}

fn has_bogus_principal_point<M: CameraModel + ?Sized>(
    model: &M,
    params: &[f64],
    width: usize,
    height: usize,
) -> bool {
    let (cx, cy) = principal_point(model, params);
    cx < 0.0 || cx > width as f64 || cy < 0.0 || cy > height as f64
}

fn has_bogus_focal_length<M: CameraModel + ?Sized>(
    model: &M,
    params: &[f64],
    width: usize,
    height: usize,
    min_focal_length_ratio: f64,
    max_focal_length_ratio: f64,
) -> bool {
    let inv_max_size = 1.0 / width.max(height) as f64;
    model.focal_length_idxs().iter().any(|&idx| {
        let ratio = params[idx] * inv_max_size;
        // NaN ratios (unknown image size) are bogus as well
        !(min_focal_length_ratio..=max_focal_length_ratio).contains(&ratio)
    })
}

fn has_bogus_extra_params<M: CameraModel + ?Sized>(
    model: &M,
    params: &[f64],
    max_extra_param: f64,
) -> bool {
    model
        .extra_params_idxs()
        .iter()
        .any(|&idx| params[idx].abs() > max_extra_param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_params(model: &dyn CameraModel) -> Vec<f64> {
        let mut params = vec![0.0; model.num_params()];
        for &idx in model.focal_length_idxs() {
            params[idx] = 500.0;
        }
        let pp = model.principal_point_idxs();
        params[pp[0]] = 320.0;
        params[pp[1]] = 240.0;
        for (i, &idx) in model.extra_params_idxs().iter().enumerate() {
            params[idx] = 0.01 / (i + 1) as f64;
        }
        if model.id() == CameraModelId::Fov {
            params[4] = 0.9;
        }
        params
    }

    #[test]
    fn test_registry_order_matches_ids() {
        for id in CameraModelId::ALL {
            let model = id.model().unwrap();
            assert_eq!(model.id(), id);
            assert_eq!(CameraModelId::from_i32(id as i32), Some(id));
        }
        assert!(CameraModelId::Invalid.model().is_none());
        assert_eq!(CameraModelId::from_i32(-1), None);
        assert_eq!(CameraModelId::from_i32(42), None);
    }

    #[test]
    fn test_name_round_trip() {
        for id in CameraModelId::ALL {
            assert_eq!(id.name().parse::<CameraModelId>().unwrap(), id);
            assert_eq!(id.to_string(), id.name());
        }
        assert!(matches!(
            "PINHOL".parse::<CameraModelId>(),
            Err(RcmError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_index_groups_are_disjoint_and_cover_params() {
        for id in CameraModelId::ALL {
            let model = id.model().unwrap();
            let fl = model.focal_length_idxs();
            assert!(fl.len() == 1 || fl.len() == 2, "{id}");
            assert_eq!(model.principal_point_idxs().len(), 2, "{id}");

            let mut all: Vec<usize> = fl
                .iter()
                .chain(model.principal_point_idxs())
                .chain(model.extra_params_idxs())
                .copied()
                .collect();
            all.sort_unstable();
            let expected: Vec<usize> = (0..model.num_params()).collect();
            assert_eq!(all, expected, "{id}");

            let info_count = model.params_info().split(',').count();
            assert_eq!(info_count, model.num_params(), "{id}");
        }
    }

    #[test]
    fn test_verify_params() {
        let model = CameraModelId::OpenCv.model().unwrap();
        assert!(model.verify_params(&[0.0; 8]));
        assert!(!model.verify_params(&[0.0; 7]));
        assert!(!model.verify_params(&[]));
    }

    #[test]
    fn test_projection_round_trip_all_models() {
        for id in CameraModelId::ALL {
            let model = id.model().unwrap();
            let params = test_params(model);

            for cam in [
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::new(0.2, -0.1, 1.0),
                Vector3::new(-0.4, 0.3, 2.0),
            ] {
                let img = model.img_from_cam(&params, &cam);
                let back = model.cam_from_img(&params, &img);
                assert!((back.z - 1.0).abs() < 1e-15);
                assert_relative_eq!(back.xy(), cam.xy() / cam.z, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_threshold_uses_mean_focal_length() {
        let model = CameraModelId::Pinhole.model().unwrap();
        let params = [400.0, 600.0, 320.0, 240.0];
        assert!((model.cam_from_img_threshold(&params, 5.0) - 0.01).abs() < 1e-15);
    }

    #[test]
    fn test_bogus_params() {
        let model = CameraModelId::SimpleRadial.model().unwrap();

        let good = [640.0, 320.0, 240.0, 0.1];
        assert!(!model.has_bogus_params(&good, 640, 480, 0.1, 10.0, 1.0));

        let zero_focal = [0.0, 320.0, 240.0, 0.1];
        assert!(model.has_bogus_params(&zero_focal, 640, 480, 0.1, 10.0, 1.0));

        let huge_focal = [100_000.0, 320.0, 240.0, 0.1];
        assert!(model.has_bogus_params(&huge_focal, 640, 480, 0.1, 10.0, 1.0));

        let outside_pp = [640.0, -1.0, 240.0, 0.1];
        assert!(model.has_bogus_params(&outside_pp, 640, 480, 0.1, 10.0, 1.0));

        let large_extra = [640.0, 320.0, 240.0, 1.5];
        assert!(model.has_bogus_params(&large_extra, 640, 480, 0.1, 10.0, 1.0));
    }

    #[test]
    fn test_is_undistorted() {
        let model = CameraModelId::Radial.model().unwrap();
        assert!(model.is_undistorted(&[500.0, 320.0, 240.0, 0.0, 0.0]));
        assert!(!model.is_undistorted(&[500.0, 320.0, 240.0, 0.0, 0.01]));

        let pinhole = CameraModelId::SimplePinhole.model().unwrap();
        assert!(pinhole.is_undistorted(&[500.0, 320.0, 240.0]));
    }
}

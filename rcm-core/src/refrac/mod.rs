//! Refractive interface models and the refractive ray caster
//!
//! A refractive model describes an optical interface (a housing port)
//! between the camera and the scene. Rays leaving the camera center are
//! bent at each surface of the port, so a pixel back-projects to a general
//! 3D ray instead of a ray through the optical center.

mod dome_port;
mod flat_port;
mod ray_caster;

pub use dome_port::DomePort;
pub use flat_port::FlatPort;
pub use ray_caster::{cam_from_img, cam_from_img_point, img_from_cam};

use crate::error::RcmError;
use crate::geometry::Ray3D;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a refractive model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum CameraRefracModelId {
    #[default]
    #[serde(rename = "INVALID")]
    Invalid = -1,
    #[serde(rename = "FLATPORT")]
    FlatPort = 0,
    #[serde(rename = "DOMEPORT")]
    DomePort = 1,
}

static REFRAC_MODELS: [&dyn RefracModel; 2] = [&FlatPort, &DomePort];

impl CameraRefracModelId {
    /// All valid identifiers in registry order
    pub const ALL: [CameraRefracModelId; 2] =
        [CameraRefracModelId::FlatPort, CameraRefracModelId::DomePort];

    pub fn name(self) -> &'static str {
        match self {
            CameraRefracModelId::Invalid => "INVALID",
            CameraRefracModelId::FlatPort => "FLATPORT",
            CameraRefracModelId::DomePort => "DOMEPORT",
        }
    }

    pub fn from_i32(id: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|model_id| *model_id as i32 == id)
    }

    pub fn is_valid(self) -> bool {
        self != CameraRefracModelId::Invalid
    }

    /// Registry entry for this identifier, `None` for [`CameraRefracModelId::Invalid`]
    pub fn model(self) -> Option<&'static dyn RefracModel> {
        match self {
            CameraRefracModelId::Invalid => None,
            id => Some(REFRAC_MODELS[id as usize]),
        }
    }
}

impl fmt::Display for CameraRefracModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CameraRefracModelId {
    type Err = RcmError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name() == name)
            .ok_or_else(|| RcmError::UnknownRefracModel(name.to_string()))
    }
}

/// Per-family contract of a refractive interface
pub trait RefracModel: Send + Sync {
    fn id(&self) -> CameraRefracModelId;

    /// Human-readable parameter ordering
    fn params_info(&self) -> &'static str;

    fn num_params(&self) -> usize;

    /// Parameters describing the interface pose, which calibration may refine
    fn optimizable_params_idxs(&self) -> &'static [usize];

    /// Trace a ray leaving the camera center with unit direction `dir`
    /// through the interface. Total internal reflection yields NaN components.
    fn refract_ray(&self, refrac_params: &[f64], dir: &Vector3<f64>) -> Ray3D;

    /// Unit axis along which the interface is rotationally symmetric
    fn refraction_axis(&self, refrac_params: &[f64]) -> Vector3<f64>;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    fn verify_params(&self, refrac_params: &[f64]) -> bool {
        refrac_params.len() == self.num_params()
    }
}

/// Ray returned when the interface cannot be traced
pub(crate) fn degenerate_ray() -> Ray3D {
    Ray3D {
        ori: Vector3::repeat(f64::NAN),
        dir: Vector3::repeat(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_ids() {
        for id in CameraRefracModelId::ALL {
            assert_eq!(id.model().unwrap().id(), id);
            assert_eq!(CameraRefracModelId::from_i32(id as i32), Some(id));
        }
        assert!(CameraRefracModelId::Invalid.model().is_none());
    }

    #[test]
    fn test_name_round_trip() {
        for id in CameraRefracModelId::ALL {
            assert_eq!(id.name().parse::<CameraRefracModelId>().unwrap(), id);
        }
        assert!(matches!(
            "FLAT".parse::<CameraRefracModelId>(),
            Err(RcmError::UnknownRefracModel(_))
        ));
    }

    #[test]
    fn test_params_info_matches_count() {
        for id in CameraRefracModelId::ALL {
            let model = id.model().unwrap();
            assert_eq!(model.params_info().split(',').count(), model.num_params());
            assert!(model.verify_params(&vec![0.0; model.num_params()]));
            assert!(!model.verify_params(&vec![0.0; model.num_params() + 1]));
        }
    }
}

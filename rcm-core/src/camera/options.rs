use serde::{Deserialize, Serialize};

/// Thresholds for [`super::Camera::has_bogus_params_with`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BogusParamsOptions {
    /// Smallest accepted ratio of focal length to `max(width, height)`
    pub min_focal_length_ratio: f64,
    /// Largest accepted ratio of focal length to `max(width, height)`
    pub max_focal_length_ratio: f64,
    /// Largest accepted magnitude of any extra (distortion) parameter
    pub max_extra_param: f64,
}

impl Default for BogusParamsOptions {
    fn default() -> Self {
        Self {
            min_focal_length_ratio: 0.1,
            max_focal_length_ratio: 10.0,
            max_extra_param: 1.0,
        }
    }
}

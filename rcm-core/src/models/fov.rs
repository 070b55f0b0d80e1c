use super::{CameraModel, CameraModelId};
use nalgebra::Vector2;

/// Switch to series expansions when `omega^2` or `r^2` drops below this.
const SERIES_EPS: f64 = 1e-4;

/// Field-of-view model with closed-form inverse: `fx, fy, cx, cy, omega`
#[derive(Debug, Clone, Copy, Default)]
pub struct Fov;

impl CameraModel for Fov {
    fn id(&self) -> CameraModelId {
        CameraModelId::Fov
    }

    fn params_info(&self) -> &'static str {
        "fx, fy, cx, cy, omega"
    }

    fn focal_length_idxs(&self) -> &'static [usize] {
        &[0, 1]
    }

    fn principal_point_idxs(&self) -> &'static [usize] {
        &[2, 3]
    }

    fn extra_params_idxs(&self) -> &'static [usize] {
        &[4]
    }

    // r_d = atan(2 r tan(omega / 2)) / omega
    fn distort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        let omega = params[4];
        let omega2 = omega * omega;
        let r2 = point.norm_squared();

        let factor = if omega2 < SERIES_EPS {
            1.0 + omega2 * (1.0 / 12.0 - r2 / 3.0)
        } else if r2 < SERIES_EPS {
            let tan_half_omega = (omega / 2.0).tan();
            2.0 * tan_half_omega / omega * (1.0 - 4.0 * r2 * tan_half_omega * tan_half_omega / 3.0)
        } else {
            let r = r2.sqrt();
            (2.0 * r * (omega / 2.0).tan()).atan() / (r * omega)
        };

        point * factor
    }

    // r = tan(r_d omega) / (2 tan(omega / 2))
    fn undistort(&self, params: &[f64], point: &Vector2<f64>) -> Vector2<f64> {
        let omega = params[4];
        let omega2 = omega * omega;
        let r2 = point.norm_squared();

        let factor = if omega2 < SERIES_EPS {
            1.0 + omega2 * (r2 / 3.0 - 1.0 / 12.0)
        } else if r2 < SERIES_EPS {
            omega * (1.0 + r2 * omega2 / 3.0) / (2.0 * (omega / 2.0).tan())
        } else {
            let r = r2.sqrt();
            (r * omega).tan() / (2.0 * r * (omega / 2.0).tan())
        };

        point * factor
    }
}

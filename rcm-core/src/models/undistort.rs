use log::trace;
use nalgebra::{Matrix2, Vector2};

const NUM_ITERATIONS: usize = 100;
const MAX_STEP_NORM_SQUARED: f64 = 1e-20;
const REL_STEP_SIZE: f64 = 1e-6;

/// Remove distortion from normalized image coordinates using Newton-Raphson
/// iteration with a central-difference Jacobian.
///
/// `distort` maps undistorted to distorted normalized coordinates. If the
/// iteration does not converge the last estimate is returned.
pub(crate) fn iterative_undistortion<F>(distort: F, distorted: &Vector2<f64>) -> Vector2<f64>
where
    F: Fn(&Vector2<f64>) -> Vector2<f64>,
{
    let mut x = *distorted;

    for _ in 0..NUM_ITERATIONS {
        let step_x = f64::EPSILON.max(REL_STEP_SIZE * x.x.abs());
        let step_y = f64::EPSILON.max(REL_STEP_SIZE * x.y.abs());

        let residual = distort(&x) - distorted;

        let dx = (distort(&Vector2::new(x.x + step_x, x.y))
            - distort(&Vector2::new(x.x - step_x, x.y)))
            / (2.0 * step_x);
        let dy = (distort(&Vector2::new(x.x, x.y + step_y))
            - distort(&Vector2::new(x.x, x.y - step_y)))
            / (2.0 * step_y);

        let jacobian = Matrix2::from_columns(&[dx, dy]);
        let Some(inv_jacobian) = jacobian.try_inverse() else {
            trace!("singular jacobian while undistorting {distorted:?}");
            return x;
        };

        let step = inv_jacobian * residual;
        x -= step;

        if step.norm_squared() < MAX_STEP_NORM_SQUARED {
            return x;
        }
    }

    trace!("undistortion of {distorted:?} did not converge");
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brown_conrady(p: &Vector2<f64>) -> Vector2<f64> {
        let (k1, k2, p1, p2) = (-0.1, 0.01, 0.001, -0.001);
        let (x, y) = (p.x, p.y);
        let r2 = x * x + y * y;
        let radial = 1.0 + k1 * r2 + k2 * r2 * r2;
        Vector2::new(
            x * radial + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x),
            y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y,
        )
    }

    #[test]
    fn identity_round_trip() {
        let point = Vector2::new(0.123, -0.456);
        let undistorted = iterative_undistortion(|p| *p, &point);
        assert!((undistorted - point).norm() < 1e-12);
    }

    #[test]
    fn brown_conrady_round_trip() {
        let point = Vector2::new(0.2, -0.15);
        let distorted = brown_conrady(&point);
        let undistorted = iterative_undistortion(brown_conrady, &distorted);
        assert!((undistorted - point).norm() < 1e-10);
    }

    #[test]
    fn origin_stays_at_origin() {
        let undistorted = iterative_undistortion(brown_conrady, &Vector2::zeros());
        assert!(undistorted.norm() < 1e-12);
    }

    #[test]
    fn returns_estimate_on_singular_jacobian() {
        let undistorted = iterative_undistortion(|_| Vector2::zeros(), &Vector2::new(1.0, 2.0));
        assert_eq!(undistorted, Vector2::new(1.0, 2.0));
    }
}

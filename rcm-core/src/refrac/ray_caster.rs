use super::RefracModel;
use crate::geometry::Ray3D;
use crate::models::CameraModel;
use log::trace;
use nalgebra::{Matrix2, Vector2, Vector3};

const NUM_ITERATIONS: usize = 100;
const MAX_STEP_NORM_SQUARED: f64 = 1e-20;
const REL_STEP_SIZE: f64 = 1e-6;

/// Back-project an image point through the camera model and trace it
/// through the refractive interface.
///
/// Total internal reflection is not detected; the returned ray then has NaN
/// components.
pub fn cam_from_img(
    model: &dyn CameraModel,
    refrac_model: &dyn RefracModel,
    params: &[f64],
    refrac_params: &[f64],
    image_point: &Vector2<f64>,
) -> Ray3D {
    let dir = model.cam_from_img(params, image_point).normalize();
    refrac_model.refract_ray(refrac_params, &dir)
}

/// Point on the refracted ray of `image_point` whose camera-frame z
/// coordinate equals `depth`.
pub fn cam_from_img_point(
    model: &dyn CameraModel,
    refrac_model: &dyn RefracModel,
    params: &[f64],
    refrac_params: &[f64],
    image_point: &Vector2<f64>,
    depth: f64,
) -> Vector3<f64> {
    let ray = cam_from_img(model, refrac_model, params, refrac_params, image_point);
    point_at_depth(&ray, depth)
}

/// Project a camera-frame point through the refractive interface.
///
/// Solved with Newton-Raphson on the image point, starting from the
/// non-refractive projection. The residual is the offset between the target
/// point and the refracted ray on the plane of constant depth through the
/// target. Returns NaN if the refracted ray degenerates.
pub fn img_from_cam(
    model: &dyn CameraModel,
    refrac_model: &dyn RefracModel,
    params: &[f64],
    refrac_params: &[f64],
    cam_point: &Vector3<f64>,
) -> Vector2<f64> {
    let residual = |image_point: &Vector2<f64>| -> Vector2<f64> {
        let ray = cam_from_img(model, refrac_model, params, refrac_params, image_point);
        point_at_depth(&ray, cam_point.z).xy() - cam_point.xy()
    };

    let mut image_point = model.img_from_cam(params, cam_point);

    for _ in 0..NUM_ITERATIONS {
        let r = residual(&image_point);
        if !r.iter().all(|v| v.is_finite()) {
            return Vector2::repeat(f64::NAN);
        }

        let step_x = REL_STEP_SIZE * image_point.x.abs().max(1.0);
        let step_y = REL_STEP_SIZE * image_point.y.abs().max(1.0);
        let dx = (residual(&Vector2::new(image_point.x + step_x, image_point.y))
            - residual(&Vector2::new(image_point.x - step_x, image_point.y)))
            / (2.0 * step_x);
        let dy = (residual(&Vector2::new(image_point.x, image_point.y + step_y))
            - residual(&Vector2::new(image_point.x, image_point.y - step_y)))
            / (2.0 * step_y);

        let Some(inv_jacobian) = Matrix2::from_columns(&[dx, dy]).try_inverse() else {
            trace!("singular jacobian projecting {cam_point:?} through refractive interface");
            return image_point;
        };

        let step = inv_jacobian * r;
        image_point -= step;

        if step.norm_squared() < MAX_STEP_NORM_SQUARED {
            return image_point;
        }
    }

    trace!("refractive projection of {cam_point:?} did not converge");
    image_point
}

fn point_at_depth(ray: &Ray3D, depth: f64) -> Vector3<f64> {
    ray.at((depth - ray.ori.z) / ray.dir.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CameraModelId;
    use crate::refrac::CameraRefracModelId;
    use approx::assert_relative_eq;

    const PARAMS: [f64; 4] = [1000.0, 1000.0, 960.0, 540.0];
    const FLAT_PARAMS: [f64; 8] = [0.0, 0.0, 1.0, 0.05, 0.02, 1.0, 1.52, 1.334];
    const DOME_PARAMS: [f64; 8] = [0.001, -0.002, 0.003, 0.05, 0.007, 1.0, 1.473, 1.334];

    fn models(refrac_id: CameraRefracModelId) -> (&'static dyn CameraModel, &'static dyn RefracModel) {
        (
            CameraModelId::Pinhole.model().unwrap(),
            refrac_id.model().unwrap(),
        )
    }

    #[test]
    fn test_point_at_depth() {
        let (model, flat) = models(CameraRefracModelId::FlatPort);
        let point = cam_from_img_point(
            model,
            flat,
            &PARAMS,
            &FLAT_PARAMS,
            &Vector2::new(1200.0, 400.0),
            3.0,
        );
        assert!((point.z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_port_projection_round_trip() {
        let (model, flat) = models(CameraRefracModelId::FlatPort);
        for image_point in [
            Vector2::new(960.0, 540.0),
            Vector2::new(1500.0, 300.0),
            Vector2::new(100.0, 1000.0),
        ] {
            let point = cam_from_img_point(model, flat, &PARAMS, &FLAT_PARAMS, &image_point, 2.5);
            let projected = img_from_cam(model, flat, &PARAMS, &FLAT_PARAMS, &point);
            assert_relative_eq!(projected, image_point, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_dome_port_projection_round_trip() {
        let (model, dome) = models(CameraRefracModelId::DomePort);
        for image_point in [Vector2::new(700.0, 200.0), Vector2::new(1800.0, 900.0)] {
            let point = cam_from_img_point(model, dome, &PARAMS, &DOME_PARAMS, &image_point, 4.0);
            let projected = img_from_cam(model, dome, &PARAMS, &DOME_PARAMS, &point);
            assert_relative_eq!(projected, image_point, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_refraction_narrows_field_of_view() {
        let (model, flat) = models(CameraRefracModelId::FlatPort);
        let image_point = Vector2::new(1500.0, 540.0);
        let ray = cam_from_img(model, flat, &PARAMS, &FLAT_PARAMS, &image_point);
        let unrefracted = model.cam_from_img(&PARAMS, &image_point).normalize();
        assert!(ray.dir.x < unrefracted.x);
        assert!(ray.dir.x > 0.0);
    }

    #[test]
    fn test_total_internal_reflection_projects_to_nan() {
        let (model, flat) = models(CameraRefracModelId::FlatPort);
        let params = [0.0, 0.0, 1.0, 0.05, 0.02, 1.334, 1.52, 1.0];
        let image_point = Vector2::new(960.0 + 3000.0, 540.0);
        let ray = cam_from_img(model, flat, &PARAMS, &params, &image_point);
        assert!(!ray.is_finite());
    }
}

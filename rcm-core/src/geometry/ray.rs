use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Rays closer than this to parallel have no unique closest point.
const PARALLEL_EPS: f64 = 1e-12;

/// 3D ray with an origin and a unit direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray3D {
    pub ori: Vector3<f64>,
    pub dir: Vector3<f64>,
}

impl Default for Ray3D {
    fn default() -> Self {
        Self {
            ori: Vector3::zeros(),
            dir: Vector3::z(),
        }
    }
}

impl Ray3D {
    /// Create a new ray. The direction is normalized.
    pub fn new(ori: Vector3<f64>, dir: Vector3<f64>) -> Self {
        Self {
            ori,
            dir: dir.normalize(),
        }
    }

    /// Point at the given distance along the ray
    pub fn at(&self, distance: f64) -> Vector3<f64> {
        self.ori + self.dir * distance
    }

    /// False if any component is NaN or infinite, e.g. after total internal
    /// reflection in a refractive interface.
    pub fn is_finite(&self) -> bool {
        self.ori.iter().chain(self.dir.iter()).all(|v| v.is_finite())
    }

    /// Point on the line `line_ori + s * line_dir` closest to the line
    /// supporting this ray. Returns `None` if both lines are parallel.
    pub fn closest_point_on_line(
        &self,
        line_ori: &Vector3<f64>,
        line_dir: &Vector3<f64>,
    ) -> Option<Vector3<f64>> {
        let a = line_dir.dot(line_dir);
        let b = line_dir.dot(&self.dir);
        let c = self.dir.dot(&self.dir);
        let w0 = line_ori - self.ori;
        let d = line_dir.dot(&w0);
        let e = self.dir.dot(&w0);

        let denom = a * c - b * b;
        if denom.abs() < PARALLEL_EPS {
            return None;
        }

        let s = (b * e - c * d) / denom;
        Some(line_ori + line_dir * s)
    }
}

/// Signed distance along the ray to the plane `normal . x = dist`.
///
/// Infinite or NaN if the ray is parallel to the plane.
pub fn ray_plane_intersection(
    ray_ori: &Vector3<f64>,
    ray_dir: &Vector3<f64>,
    normal: &Vector3<f64>,
    dist: f64,
) -> f64 {
    (dist - normal.dot(ray_ori)) / normal.dot(ray_dir)
}

/// Distances along a unit-direction ray to the sphere surface, smallest
/// first. `None` if the ray misses the sphere.
pub fn ray_sphere_intersection(
    ray_ori: &Vector3<f64>,
    ray_dir: &Vector3<f64>,
    center: &Vector3<f64>,
    radius: f64,
) -> Option<(f64, f64)> {
    let oc = ray_ori - center;
    let b = ray_dir.dot(&oc);
    let c = oc.norm_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let sqrt_disc = disc.sqrt();
    Some((-b - sqrt_disc, -b + sqrt_disc))
}

/// Refract a unit direction at an interface following Snell's law.
///
/// `normal` is the unit interface normal pointing into the second medium,
/// i.e. on the side the ray travels towards. Under total internal
/// reflection the result is NaN.
pub fn compute_refraction(normal: &Vector3<f64>, n1: f64, n2: f64, dir: &Vector3<f64>) -> Vector3<f64> {
    if n1 == n2 {
        return *dir;
    }

    let r = n1 / n2;
    let c = normal.dot(dir);
    let scale = r * c - (1.0 - r * r * (1.0 - c * c)).sqrt();
    (dir * r - normal * scale).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_new_normalizes() {
        let ray = Ray3D::new(Vector3::zeros(), Vector3::new(0.0, 3.0, 4.0));
        assert!((ray.dir.norm() - 1.0).abs() < 1e-12);
        assert_relative_eq!(ray.at(5.0), Vector3::new(0.0, 3.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_ray_is_finite() {
        let ray = Ray3D::default();
        assert!(ray.is_finite());

        let ray = Ray3D {
            ori: Vector3::zeros(),
            dir: Vector3::repeat(f64::NAN),
        };
        assert!(!ray.is_finite());
    }

    #[test]
    fn test_closest_point_intersecting_lines() {
        // Ray crossing the z axis at z = 2
        let ray = Ray3D::new(Vector3::new(1.0, 0.0, 3.0), Vector3::new(1.0, 0.0, 1.0));
        let point = ray
            .closest_point_on_line(&Vector3::zeros(), &Vector3::z())
            .unwrap();
        assert_relative_eq!(point, Vector3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_closest_point_skew_lines() {
        // Ray parallel to x at height y = 1, z = 5
        let ray = Ray3D::new(Vector3::new(0.0, 1.0, 5.0), Vector3::x());
        let point = ray
            .closest_point_on_line(&Vector3::zeros(), &Vector3::z())
            .unwrap();
        assert_relative_eq!(point, Vector3::new(0.0, 0.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_closest_point_parallel_lines() {
        let ray = Ray3D::new(Vector3::new(1.0, 0.0, 0.0), Vector3::z());
        assert!(ray
            .closest_point_on_line(&Vector3::zeros(), &Vector3::z())
            .is_none());
    }

    #[test]
    fn test_ray_plane_intersection() {
        let d = ray_plane_intersection(
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.6, 0.8),
            &Vector3::z(),
            2.0,
        );
        assert!((d - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_ray_sphere_intersection_from_inside() {
        let (t0, t1) = ray_sphere_intersection(
            &Vector3::zeros(),
            &Vector3::z(),
            &Vector3::zeros(),
            3.0,
        )
        .unwrap();
        assert!((t0 + 3.0).abs() < 1e-12);
        assert!((t1 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ray_sphere_miss() {
        let hit = ray_sphere_intersection(
            &Vector3::new(0.0, 5.0, 0.0),
            &Vector3::z(),
            &Vector3::zeros(),
            1.0,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_refraction_normal_incidence() {
        let dir = compute_refraction(&Vector3::z(), 1.0, 1.33, &Vector3::z());
        assert_relative_eq!(dir, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_refraction_snell_law() {
        let theta1: f64 = 0.4;
        let dir = Vector3::new(theta1.sin(), 0.0, theta1.cos());
        let (n1, n2) = (1.0, 1.5);
        let refracted = compute_refraction(&Vector3::z(), n1, n2, &dir);

        let sin_theta2 = refracted.x / refracted.norm();
        assert!((n1 * theta1.sin() - n2 * sin_theta2).abs() < 1e-12);
        assert!(refracted.z > 0.0);
    }

    #[test]
    fn test_refraction_total_internal_reflection() {
        let theta1: f64 = 1.2;
        let dir = Vector3::new(theta1.sin(), 0.0, theta1.cos());
        let refracted = compute_refraction(&Vector3::z(), 1.5, 1.0, &dir);
        assert!(refracted.iter().all(|v| v.is_nan()));
    }
}

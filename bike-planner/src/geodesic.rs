//! Ellipsoidal distance on WGS84.
//!
//! Vincenty's inverse formula, iterated to convergence. Used to annotate
//! station candidates with their distance from a query point; ranking by
//! routed duration is left to the routing provider.

use crate::domain::Location;

/// WGS84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Convergence tolerance on lambda, in radians.
const TOLERANCE: f64 = 1e-12;

/// Iteration cap. Near-antipodal points may never converge.
const MAX_ITERATIONS: usize = 200;

/// Result of the inverse geodesic problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverse {
    /// Distance along the ellipsoid, in metres.
    pub distance_m: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// False when the iteration cap was hit; `distance_m` is then computed
    /// from the last iterate and is an approximation.
    pub converged: bool,
}

/// Distance in metres between two points along the WGS84 ellipsoid.
///
/// Returns exactly `0.0` for identical points.
///
/// ```
/// use bike_planner::domain::Location;
/// use bike_planner::geodesic::distance;
///
/// let p = Location::new(48.856613, 2.352222).unwrap();
/// assert_eq!(distance(p, p), 0.0);
/// ```
pub fn distance(p1: Location, p2: Location) -> f64 {
    inverse(p1, p2).distance_m
}

/// Solve the inverse geodesic problem between two points.
pub fn inverse(p1: Location, p2: Location) -> Inverse {
    if p1 == p2 {
        return Inverse {
            distance_m: 0.0,
            iterations: 0,
            converged: true,
        };
    }

    let b = (1.0 - WGS84_F) * WGS84_A;

    let l = (p2.longitude() - p1.longitude()).to_radians();
    let u1 = ((1.0 - WGS84_F) * p1.latitude().to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * p2.latitude().to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut iterations = 0;
    let mut converged = false;

    // Values from the latest iterate, needed after the loop.
    let mut sin_sigma;
    let mut cos_sigma;
    let mut sigma;
    let mut cos_sq_alpha;
    let mut cos_2sigma_m;

    loop {
        iterations += 1;

        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let cross = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        sin_sigma = ((cos_u2 * sin_lambda).powi(2) + cross.powi(2)).sqrt();

        if sin_sigma == 0.0 {
            // Coincident points.
            return Inverse {
                distance_m: 0.0,
                iterations,
                converged: true,
            };
        }

        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // Zero on the equatorial line.
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < TOLERANCE {
            converged = true;
            break;
        }
        if iterations >= MAX_ITERATIONS {
            break;
        }
    }

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - b * b) / (b * b);
    let big_a =
        1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma.powi(2))
                        * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

    Inverse {
        distance_m: b * big_a * (sigma - delta_sigma),
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn loc(lon: f64, lat: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    #[test]
    fn zero_distance() {
        assert_eq!(distance(loc(0.0, 0.0), loc(0.0, 0.0)), 0.0);
    }

    #[test]
    fn berlin_to_paris() {
        let berlin = loc(13.404954, 52.520008);
        let paris = loc(2.352222, 48.856613);

        let result = inverse(berlin, paris);
        assert!(result.converged);
        assert_abs_diff_eq!(result.distance_m, 879_694.663, epsilon = 1.0);
    }

    #[test]
    fn one_degree_along_equator() {
        // Equatorial arc: a * pi / 180
        let d = distance(loc(0.0, 0.0), loc(1.0, 0.0));
        assert_abs_diff_eq!(d, 111_319.491, epsilon = 0.01);
    }

    #[test]
    fn meridian_quarter() {
        // Equator to pole along a meridian, WGS84 quarter meridian.
        let d = distance(loc(0.0, 0.0), loc(0.0, 90.0));
        assert_abs_diff_eq!(d, 10_001_965.729, epsilon = 1.0);
    }

    #[test]
    fn near_antipodal_terminates() {
        let result = inverse(loc(0.0, 0.0), loc(179.7, 0.5));
        assert!(result.iterations <= MAX_ITERATIONS);
        assert!(result.distance_m.is_finite());
    }

    #[test]
    fn antipodal_on_equator_hits_iteration_cap() {
        let result = inverse(loc(0.0, 0.0), loc(180.0, 0.0));

        assert!(!result.converged);
        assert_eq!(result.iterations, MAX_ITERATIONS);
        // The last iterate is still a usable approximation of the true
        // 20 003 931 m (twice the quarter meridian).
        assert!(result.distance_m.is_finite());
        assert!(result.distance_m > 19_500_000.0 && result.distance_m < 20_100_000.0);
    }

    proptest! {
        #[test]
        fn same_point_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let p = loc(lon, lat);
            prop_assert_eq!(distance(p, p), 0.0);
        }

        #[test]
        fn symmetric_and_non_negative(
            lat1 in -80.0f64..80.0, lon1 in -170.0f64..170.0,
            dlat in -5.0f64..5.0, dlon in -5.0f64..5.0,
        ) {
            let a = loc(lon1, lat1);
            let b = loc(lon1 + dlon, lat1 + dlat);
            let ab = distance(a, b);
            let ba = distance(b, a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-3);
        }
    }
}

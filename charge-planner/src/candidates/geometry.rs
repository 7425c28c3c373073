//! Point-to-polyline projection.

use crate::domain::LatLng;

/// Kilometres per degree of longitude at the equator.
const KM_PER_DEG_LNG_EQUATOR: f64 = 111.320;

/// Kilometres per degree of latitude.
const KM_PER_DEG_LAT: f64 = 110.574;

/// Project `p` onto segment `a`-`b`.
///
/// Returns the distance from `p` to the closest point of the segment (km)
/// and that point's position along the segment as a fraction in `[0, 1]`.
/// Uses a local equirectangular projection centred on `p`, which is
/// accurate at the scale of a lateral tolerance.
pub fn project_onto_segment(p: LatLng, a: LatLng, b: LatLng) -> (f64, f64) {
    let kx = KM_PER_DEG_LNG_EQUATOR * p.lat.to_radians().cos();
    let ky = KM_PER_DEG_LAT;

    let (ax, ay) = ((a.lng - p.lng) * kx, (a.lat - p.lat) * ky);
    let (bx, by) = ((b.lng - p.lng) * kx, (b.lat - p.lat) * ky);
    let (dx, dy) = (bx - ax, by - ay);

    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((cx * cx + cy * cy).sqrt(), t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_beside_meridian_segment() {
        let a = LatLng::new(0.0, 0.0);
        let b = LatLng::new(1.0, 0.0);
        let p = LatLng::new(0.5, 0.01);
        let (lateral, t) = project_onto_segment(p, a, b);
        assert!((t - 0.5).abs() < 1e-9);
        assert!((lateral - 0.01 * KM_PER_DEG_LNG_EQUATOR * 0.5f64.to_radians().cos()).abs() < 1e-9);
    }

    #[test]
    fn beyond_endpoint_clamps() {
        let a = LatLng::new(0.0, 0.0);
        let b = LatLng::new(1.0, 0.0);
        let (lateral, t) = project_onto_segment(LatLng::new(1.5, 0.0), a, b);
        assert_eq!(t, 1.0);
        assert!((lateral - 0.5 * KM_PER_DEG_LAT).abs() < 1e-9);

        let (_, t) = project_onto_segment(LatLng::new(-0.2, 0.0), a, b);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn degenerate_segment() {
        let a = LatLng::new(1.0, 1.0);
        let (lateral, t) = project_onto_segment(LatLng::new(1.0, 1.0), a, a);
        assert_eq!(t, 0.0);
        assert_eq!(lateral, 0.0);
    }
}

use interp::{InterpMode, interp};

/// Table altitudes, km
const ALTITUDE: [f64; 10] = [
    100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0, 1000.0,
];

/// Mean density at each table altitude, kg/m³
const DENSITY: [f64; 10] = [
    5.603998064021879e-07,
    2.540582078157406e-10,
    1.915693553323112e-11,
    2.802563293290757e-12,
    5.215070519051597e-13,
    1.136639043398080e-13,
    3.069405743845089e-14,
    1.135772369932094e-14,
    5.758938544921416e-15,
    3.560576449319286e-15,
];

/// Air density in kg/m³ at `altitude` km, linear between table points.
/// Outside the table the end segments are extrapolated and floored at zero.
pub fn density(altitude: f64) -> f64 {
    interp(&ALTITUDE, &DENSITY, altitude, &InterpMode::Extrapolate).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-20;

    #[test]
    fn test_table_points() {
        assert_abs_diff_eq!(density(400.0), 2.802563293290757e-12, epsilon = TOL);
        assert_abs_diff_eq!(density(1000.0), 3.560576449319286e-15, epsilon = TOL);
    }

    #[test]
    fn test_interpolates_between_points() {
        let expected = 0.5 * (5.215070519051597e-13 + 1.136639043398080e-13);
        assert_abs_diff_eq!(density(550.0), expected, epsilon = TOL);
    }

    #[test]
    fn test_never_negative() {
        assert!(density(5000.0) >= 0.0);
        assert!(density(1200.0) >= 0.0);
    }
}

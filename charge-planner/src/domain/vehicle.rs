//! Vehicle profiles and charging curves.

use serde::{Deserialize, Serialize};

use super::{DomainError, PowerType};

/// Mass assumed when a profile does not state one (kg).
pub const DEFAULT_MASS_KG: f64 = 1700.0;

/// One breakpoint of a charging curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// State of charge (%)
    pub soc: f64,
    /// Maximum charge rate the battery accepts at this state of charge (kW)
    pub power_kw: f64,
}

impl CurvePoint {
    /// Create a breakpoint.
    pub fn new(soc: f64, power_kw: f64) -> Self {
        Self { soc, power_kw }
    }
}

/// A piecewise-linear charging curve.
///
/// # Invariants
///
/// - At least two breakpoints
/// - First breakpoint at 0%, last at 100%
/// - State of charge non-decreasing between breakpoints
/// - Rates finite and non-negative
///
/// # Examples
///
/// ```
/// use charge_planner::domain::{ChargingCurve, CurvePoint};
///
/// let curve = ChargingCurve::new(vec![
///     CurvePoint::new(0.0, 150.0),
///     CurvePoint::new(80.0, 150.0),
///     CurvePoint::new(100.0, 50.0),
/// ])
/// .unwrap();
///
/// assert_eq!(curve.rate_at(40.0), 150.0);
/// assert_eq!(curve.rate_at(90.0), 100.0);
///
/// // Curves that stop short of 100% are rejected
/// assert!(ChargingCurve::new(vec![CurvePoint::new(0.0, 50.0), CurvePoint::new(80.0, 50.0)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct ChargingCurve {
    points: Vec<CurvePoint>,
}

impl ChargingCurve {
    /// Build a curve from breakpoints, validating every invariant.
    pub fn new(points: Vec<CurvePoint>) -> Result<Self, DomainError> {
        if points.is_empty() {
            return Err(DomainError::EmptyCurve);
        }

        for (index, point) in points.iter().enumerate() {
            let soc_ok = point.soc.is_finite() && (0.0..=100.0).contains(&point.soc);
            let rate_ok = point.power_kw.is_finite() && point.power_kw >= 0.0;
            if !soc_ok || !rate_ok {
                return Err(DomainError::CurvePointOutOfRange { index });
            }
            if index > 0 && point.soc < points[index - 1].soc {
                return Err(DomainError::CurveNotMonotonic { index });
            }
        }

        let spans = points.first().is_some_and(|p| p.soc == 0.0)
            && points.last().is_some_and(|p| p.soc == 100.0);
        if !spans {
            return Err(DomainError::CurveDoesNotSpan);
        }

        Ok(Self { points })
    }

    /// A curve accepting the same rate at every state of charge.
    pub fn flat(power_kw: f64) -> Result<Self, DomainError> {
        Self::new(vec![
            CurvePoint::new(0.0, power_kw),
            CurvePoint::new(100.0, power_kw),
        ])
    }

    /// A typical lithium-ion taper for a battery peaking at `peak_kw`.
    ///
    /// Full rate to 55%, then stepping down through 70% and 80% to a
    /// quarter of the peak at 100%.
    pub fn typical(peak_kw: f64) -> Result<Self, DomainError> {
        Self::new(vec![
            CurvePoint::new(0.0, peak_kw),
            CurvePoint::new(55.0, peak_kw),
            CurvePoint::new(70.0, peak_kw * 0.7),
            CurvePoint::new(80.0, peak_kw * 0.45),
            CurvePoint::new(100.0, peak_kw * 0.25),
        ])
    }

    /// Returns the breakpoints.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Highest rate anywhere on the curve (kW).
    pub fn peak_kw(&self) -> f64 {
        self.points.iter().map(|p| p.power_kw).fold(0.0, f64::max)
    }

    /// Charge rate at `soc`, interpolated between the bracketing breakpoints.
    ///
    /// Inputs outside `[0, 100]` are clamped.
    pub fn rate_at(&self, soc: f64) -> f64 {
        let soc = if soc.is_nan() { 0.0 } else { soc.clamp(0.0, 100.0) };

        for pair in self.points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if soc > hi.soc {
                continue;
            }
            if hi.soc <= lo.soc {
                return hi.power_kw;
            }
            let t = (soc - lo.soc) / (hi.soc - lo.soc);
            return lo.power_kw + t * (hi.power_kw - lo.power_kw);
        }

        // Unreachable for a spanning curve; fall back to the last breakpoint
        self.points.last().map_or(0.0, |p| p.power_kw)
    }
}

impl TryFrom<Vec<CurvePoint>> for ChargingCurve {
    type Error = DomainError;

    fn try_from(points: Vec<CurvePoint>) -> Result<Self, Self::Error> {
        ChargingCurve::new(points)
    }
}

impl From<ChargingCurve> for Vec<CurvePoint> {
    fn from(curve: ChargingCurve) -> Self {
        curve.points
    }
}

/// Raw vehicle record as it appears in catalogs and scenario files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VehicleRecord {
    id: String,
    #[serde(default)]
    make: String,
    #[serde(default)]
    model: String,
    battery_kwh: f64,
    range_km: f64,
    max_dc_kw: f64,
    #[serde(default)]
    max_ac_kw: Option<f64>,
    #[serde(default)]
    mass_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    connectors: Vec<String>,
    curve: ChargingCurve,
}

/// A vehicle's battery, range and charging characteristics.
///
/// Fields are validated at construction, so code that receives a
/// `VehicleProfile` can divide by capacity and range freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VehicleRecord", into = "VehicleRecord")]
pub struct VehicleProfile {
    id: String,
    make: String,
    model: String,
    battery_kwh: f64,
    range_km: f64,
    max_dc_kw: f64,
    max_ac_kw: Option<f64>,
    mass_kg: f64,
    connectors: Vec<String>,
    curve: ChargingCurve,
}

impl VehicleProfile {
    /// Create a profile.
    ///
    /// # Errors
    ///
    /// Returns `Err` if capacity, range or DC power is not a positive,
    /// finite number.
    pub fn new(
        id: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        battery_kwh: f64,
        range_km: f64,
        max_dc_kw: f64,
        curve: ChargingCurve,
    ) -> Result<Self, DomainError> {
        if !is_positive(battery_kwh) {
            return Err(DomainError::InvalidVehicle(
                "battery capacity must be positive",
            ));
        }
        if !is_positive(range_km) {
            return Err(DomainError::InvalidVehicle("range must be positive"));
        }
        if !is_positive(max_dc_kw) {
            return Err(DomainError::InvalidVehicle(
                "maximum DC power must be positive",
            ));
        }

        Ok(Self {
            id: id.into(),
            make: make.into(),
            model: model.into(),
            battery_kwh,
            range_km,
            max_dc_kw,
            max_ac_kw: None,
            mass_kg: DEFAULT_MASS_KG,
            connectors: Vec::new(),
            curve,
        })
    }

    /// Set the vehicle mass used for elevation energy.
    pub fn with_mass_kg(mut self, mass_kg: f64) -> Result<Self, DomainError> {
        if !is_positive(mass_kg) {
            return Err(DomainError::InvalidVehicle("mass must be positive"));
        }
        self.mass_kg = mass_kg;
        Ok(self)
    }

    /// Set the on-board charger limit used at AC stations.
    pub fn with_max_ac_kw(mut self, max_ac_kw: f64) -> Result<Self, DomainError> {
        if !is_positive(max_ac_kw) {
            return Err(DomainError::InvalidVehicle(
                "maximum AC power must be positive",
            ));
        }
        self.max_ac_kw = Some(max_ac_kw);
        Ok(self)
    }

    /// Set the charging inlets, e.g. `["CCS Type 2", "Type 2"]`.
    pub fn with_connectors<S: Into<String>>(mut self, connectors: impl IntoIterator<Item = S>) -> Self {
        self.connectors = connectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Usable battery capacity (kWh).
    pub fn battery_kwh(&self) -> f64 {
        self.battery_kwh
    }

    /// Rated range (km).
    pub fn range_km(&self) -> f64 {
        self.range_km
    }

    /// Maximum DC charge power (kW).
    pub fn max_dc_kw(&self) -> f64 {
        self.max_dc_kw
    }

    /// On-board AC charger limit (kW), if known.
    pub fn max_ac_kw(&self) -> Option<f64> {
        self.max_ac_kw
    }

    /// Vehicle mass (kg).
    pub fn mass_kg(&self) -> f64 {
        self.mass_kg
    }

    /// Charging inlets; empty when unknown.
    pub fn connectors(&self) -> &[String] {
        &self.connectors
    }

    pub fn curve(&self) -> &ChargingCurve {
        &self.curve
    }

    /// Baseline consumption derived from capacity and rated range (kWh/km).
    pub fn baseline_kwh_per_km(&self) -> f64 {
        self.battery_kwh / self.range_km
    }

    /// Station power this vehicle can actually draw from a connector.
    ///
    /// AC sessions are bounded by the on-board charger; DC sessions are
    /// bounded later by the DC limit and the curve.
    pub fn station_limit_kw(&self, station_kw: f64, power_type: PowerType) -> f64 {
        match (power_type, self.max_ac_kw) {
            (PowerType::Ac, Some(ac)) => station_kw.min(ac),
            _ => station_kw,
        }
    }
}

impl TryFrom<VehicleRecord> for VehicleProfile {
    type Error = DomainError;

    fn try_from(record: VehicleRecord) -> Result<Self, Self::Error> {
        let mut profile = VehicleProfile::new(
            record.id,
            record.make,
            record.model,
            record.battery_kwh,
            record.range_km,
            record.max_dc_kw,
            record.curve,
        )?;
        if let Some(mass) = record.mass_kg {
            profile = profile.with_mass_kg(mass)?;
        }
        if let Some(ac) = record.max_ac_kw {
            profile = profile.with_max_ac_kw(ac)?;
        }
        Ok(profile.with_connectors(record.connectors))
    }
}

impl From<VehicleProfile> for VehicleRecord {
    fn from(profile: VehicleProfile) -> Self {
        Self {
            id: profile.id,
            make: profile.make,
            model: profile.model,
            battery_kwh: profile.battery_kwh,
            range_km: profile.range_km,
            max_dc_kw: profile.max_dc_kw,
            max_ac_kw: profile.max_ac_kw,
            mass_kg: Some(profile.mass_kg),
            connectors: profile.connectors,
            curve: profile.curve,
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tapering_curve() -> ChargingCurve {
        ChargingCurve::new(vec![
            CurvePoint::new(0.0, 150.0),
            CurvePoint::new(80.0, 150.0),
            CurvePoint::new(100.0, 50.0),
        ])
        .unwrap()
    }

    #[test]
    fn curve_interpolates() {
        let curve = tapering_curve();
        assert_eq!(curve.rate_at(0.0), 150.0);
        assert_eq!(curve.rate_at(80.0), 150.0);
        assert!((curve.rate_at(85.0) - 125.0).abs() < 1e-9);
        assert_eq!(curve.rate_at(100.0), 50.0);
    }

    #[test]
    fn curve_clamps_out_of_range_soc() {
        let curve = tapering_curve();
        assert_eq!(curve.rate_at(-10.0), 150.0);
        assert_eq!(curve.rate_at(150.0), 50.0);
        assert_eq!(curve.rate_at(f64::NAN), 150.0);
    }

    #[test]
    fn curve_allows_steps() {
        // Repeated SoC breakpoints model an abrupt drop
        let curve = ChargingCurve::new(vec![
            CurvePoint::new(0.0, 100.0),
            CurvePoint::new(50.0, 100.0),
            CurvePoint::new(50.0, 40.0),
            CurvePoint::new(100.0, 40.0),
        ])
        .unwrap();
        assert_eq!(curve.rate_at(49.0), 100.0);
        assert_eq!(curve.rate_at(75.0), 40.0);
    }

    #[test]
    fn curve_rejects_invalid() {
        assert_eq!(ChargingCurve::new(vec![]), Err(DomainError::EmptyCurve));

        let backwards = ChargingCurve::new(vec![
            CurvePoint::new(0.0, 50.0),
            CurvePoint::new(60.0, 50.0),
            CurvePoint::new(40.0, 50.0),
            CurvePoint::new(100.0, 50.0),
        ]);
        assert_eq!(backwards, Err(DomainError::CurveNotMonotonic { index: 2 }));

        let negative = ChargingCurve::new(vec![
            CurvePoint::new(0.0, 50.0),
            CurvePoint::new(100.0, -1.0),
        ]);
        assert_eq!(negative, Err(DomainError::CurvePointOutOfRange { index: 1 }));

        let short = ChargingCurve::new(vec![CurvePoint::new(10.0, 50.0), CurvePoint::new(100.0, 50.0)]);
        assert_eq!(short, Err(DomainError::CurveDoesNotSpan));
    }

    #[test]
    fn typical_curve_tapers() {
        let curve = ChargingCurve::typical(200.0).unwrap();
        assert_eq!(curve.peak_kw(), 200.0);
        assert!(curve.rate_at(90.0) < curve.rate_at(60.0));
        assert_eq!(curve.rate_at(100.0), 50.0);
    }

    #[test]
    fn profile_validates() {
        let curve = tapering_curve();
        assert!(VehicleProfile::new("x", "M", "X", 0.0, 400.0, 100.0, curve.clone()).is_err());
        assert!(VehicleProfile::new("x", "M", "X", 60.0, -1.0, 100.0, curve.clone()).is_err());
        assert!(VehicleProfile::new("x", "M", "X", 60.0, 400.0, f64::NAN, curve.clone()).is_err());

        let profile = VehicleProfile::new("x", "M", "X", 75.0, 480.0, 150.0, curve).unwrap();
        assert!((profile.baseline_kwh_per_km() - 0.15625).abs() < 1e-12);
        assert_eq!(profile.mass_kg(), DEFAULT_MASS_KG);
        assert!(profile.clone().with_mass_kg(0.0).is_err());
    }

    #[test]
    fn ac_sessions_limited_by_onboard_charger() {
        let profile = VehicleProfile::new("x", "M", "X", 75.0, 480.0, 150.0, tapering_curve())
            .unwrap()
            .with_max_ac_kw(11.0)
            .unwrap();
        assert_eq!(profile.station_limit_kw(22.0, PowerType::Ac), 11.0);
        assert_eq!(profile.station_limit_kw(180.0, PowerType::Dc), 180.0);
    }

    #[test]
    fn deserialize_validates() {
        let json = r#"{
            "id": "test-car",
            "make": "Test",
            "model": "Car",
            "battery_kwh": 64.0,
            "range_km": 400.0,
            "max_dc_kw": 100.0,
            "max_ac_kw": 11.0,
            "curve": [{"soc": 0.0, "power_kw": 100.0}, {"soc": 100.0, "power_kw": 30.0}]
        }"#;
        let profile: VehicleProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id(), "test-car");
        assert_eq!(profile.max_ac_kw(), Some(11.0));
        assert_eq!(profile.mass_kg(), DEFAULT_MASS_KG);
        assert!(profile.connectors().is_empty());

        let with_inlets = json.replace("\"max_ac_kw\": 11.0,", "\"max_ac_kw\": 11.0, \"connectors\": [\"CCS Type 2\"],");
        let profile: VehicleProfile = serde_json::from_str(&with_inlets).unwrap();
        assert_eq!(profile.connectors(), ["CCS Type 2".to_string()]);

        let bad = json.replace("\"battery_kwh\": 64.0", "\"battery_kwh\": -5.0");
        assert!(serde_json::from_str::<VehicleProfile>(&bad).is_err());

        let bad_curve = json.replace("{\"soc\": 100.0, \"power_kw\": 30.0}", "{\"soc\": 90.0, \"power_kw\": 30.0}");
        assert!(serde_json::from_str::<VehicleProfile>(&bad_curve).is_err());
    }
}

// br-core/src/units.rs

use uom::si::f64::{Energy as UomEnergy, Power as UomPower, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Power = UomPower;
pub type Time = UomTime;

/// Seconds in one hour; flow rates in model files are per hour.
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn hr(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

#[inline]
pub fn kj(v: f64) -> Energy {
    use uom::si::energy::kilojoule;
    Energy::new::<kilojoule>(v)
}

/// Energy delivered by `power_kw` over `hours`, in kWh.
pub fn electricity_kwh(power_kw: f64, hours: f64) -> f64 {
    use uom::si::energy::kilowatt_hour;
    let energy: Energy = kw(power_kw) * hr(hours);
    energy.get::<kilowatt_hour>()
}

/// Heat duty in kJ expressed in MJ.
pub fn kj_to_mj(v: f64) -> f64 {
    use uom::si::energy::megajoule;
    kj(v).get::<megajoule>()
}

/// Power equivalent of an hourly heat rate (kJ/hr) in kW.
pub fn kj_per_hr_to_kw(v: f64) -> f64 {
    use uom::si::power::kilowatt;
    let power: Power = kj(v) / hr(1.0);
    power.get::<kilowatt>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = kw(1.0);
        let _t = hr(8_000.0);
        let _e = kj(3_600.0);
    }

    #[test]
    fn kwh_over_one_hour() {
        assert!((electricity_kwh(250.0, 1.0) - 250.0).abs() < 1e-9);
        assert!((electricity_kwh(10.0, 8_000.0) - 80_000.0).abs() < 1e-6);
    }

    #[test]
    fn heat_conversions() {
        assert!((kj_to_mj(2_500.0) - 2.5).abs() < 1e-12);
        assert!((kj_per_hr_to_kw(SECONDS_PER_HOUR) - 1.0).abs() < 1e-12);
    }
}

// pf-core/src/units.rs

use uom::si::f64::{Length as UomLength, Power as UomPower, VolumeRate as UomVolumeRate};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Power = UomPower;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::length::foot;
    use uom::si::volume_rate::gallon_per_minute;

    #[test]
    fn constructors_smoke() {
        let _q = m3ps(0.01);
        let _h = m(30.0);
        let _p = w(1500.0);
    }

    #[test]
    fn imperial_inputs_land_in_si() {
        let q = VolumeRate::new::<gallon_per_minute>(100.0);
        let h = Length::new::<foot>(100.0);
        assert!((q.value - 6.309_019_64e-3).abs() < 1e-9);
        assert!((h.value - 30.48).abs() < 1e-9);
    }
}

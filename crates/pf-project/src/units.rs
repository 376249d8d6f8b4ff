//! Engineering units accepted in project files, converted to SI with `uom`.

use pf_core::units::{Length, Power, VolumeRate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uom::si::length::{foot, meter};
use uom::si::power::{horsepower, kilowatt, watt};
use uom::si::volume_rate::{
    cubic_meter_per_hour, cubic_meter_per_second, gallon_per_minute, liter_per_second,
};

/// Unit symbol that no unit enum recognises.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {quantity} unit '{symbol}'")]
pub struct UnknownUnit {
    pub quantity: &'static str,
    pub symbol: String,
}

impl UnknownUnit {
    fn new(quantity: &'static str, symbol: &str) -> Self {
        Self {
            quantity,
            symbol: symbol.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowUnit {
    #[default]
    #[serde(rename = "m3/s")]
    CubicMeterPerSecond,
    #[serde(rename = "m3/h")]
    CubicMeterPerHour,
    #[serde(rename = "l/s")]
    LiterPerSecond,
    #[serde(rename = "gpm")]
    GallonPerMinute,
}

impl FlowUnit {
    /// Value in m^3/s.
    pub fn to_si(self, value: f64) -> f64 {
        let q = match self {
            Self::CubicMeterPerSecond => VolumeRate::new::<cubic_meter_per_second>(value),
            Self::CubicMeterPerHour => VolumeRate::new::<cubic_meter_per_hour>(value),
            Self::LiterPerSecond => VolumeRate::new::<liter_per_second>(value),
            Self::GallonPerMinute => VolumeRate::new::<gallon_per_minute>(value),
        };
        q.value
    }

    /// Value in this unit from m^3/s.
    pub fn from_si(self, value: f64) -> f64 {
        let q = VolumeRate::new::<cubic_meter_per_second>(value);
        match self {
            Self::CubicMeterPerSecond => q.get::<cubic_meter_per_second>(),
            Self::CubicMeterPerHour => q.get::<cubic_meter_per_hour>(),
            Self::LiterPerSecond => q.get::<liter_per_second>(),
            Self::GallonPerMinute => q.get::<gallon_per_minute>(),
        }
    }
}

impl FromStr for FlowUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m3/s" => Ok(Self::CubicMeterPerSecond),
            "m3/h" => Ok(Self::CubicMeterPerHour),
            "l/s" => Ok(Self::LiterPerSecond),
            "gpm" | "usgpm" => Ok(Self::GallonPerMinute),
            _ => Err(UnknownUnit::new("flow", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeadUnit {
    #[default]
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "ft")]
    Foot,
}

impl HeadUnit {
    /// Value in m.
    pub fn to_si(self, value: f64) -> f64 {
        match self {
            Self::Meter => value,
            Self::Foot => Length::new::<foot>(value).get::<meter>(),
        }
    }

    pub fn from_si(self, value: f64) -> f64 {
        match self {
            Self::Meter => value,
            Self::Foot => Length::new::<meter>(value).get::<foot>(),
        }
    }
}

impl FromStr for HeadUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" => Ok(Self::Meter),
            "ft" => Ok(Self::Foot),
            _ => Err(UnknownUnit::new("head", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyUnit {
    #[default]
    Fraction,
    #[serde(alias = "%")]
    Percent,
}

impl EfficiencyUnit {
    /// Value as a fraction.
    pub fn to_si(self, value: f64) -> f64 {
        match self {
            Self::Fraction => value,
            Self::Percent => value / 100.0,
        }
    }
}

impl FromStr for EfficiencyUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fraction" | "-" => Ok(Self::Fraction),
            "%" | "percent" => Ok(Self::Percent),
            _ => Err(UnknownUnit::new("efficiency", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PowerUnit {
    #[default]
    #[serde(rename = "W")]
    Watt,
    #[serde(rename = "kW")]
    Kilowatt,
    #[serde(rename = "hp")]
    Horsepower,
}

impl PowerUnit {
    /// Value in W.
    pub fn to_si(self, value: f64) -> f64 {
        let p = match self {
            Self::Watt => Power::new::<watt>(value),
            Self::Kilowatt => Power::new::<kilowatt>(value),
            Self::Horsepower => Power::new::<horsepower>(value),
        };
        p.value
    }
}

impl FromStr for PowerUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" => Ok(Self::Watt),
            "kw" => Ok(Self::Kilowatt),
            "hp" => Ok(Self::Horsepower),
            _ => Err(UnknownUnit::new("power", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_conversions() {
        assert_eq!(FlowUnit::CubicMeterPerSecond.to_si(0.5), 0.5);
        assert!((FlowUnit::CubicMeterPerHour.to_si(3600.0) - 1.0).abs() < 1e-12);
        assert!((FlowUnit::LiterPerSecond.to_si(1000.0) - 1.0).abs() < 1e-12);
        // 1 US gpm = 6.30902e-5 m^3/s
        assert!((FlowUnit::GallonPerMinute.to_si(1.0) - 6.309_020_2e-5).abs() < 1e-11);
    }

    #[test]
    fn flow_units_invert() {
        for unit in [
            FlowUnit::CubicMeterPerSecond,
            FlowUnit::CubicMeterPerHour,
            FlowUnit::LiterPerSecond,
            FlowUnit::GallonPerMinute,
        ] {
            let v = 123.4;
            assert!((unit.from_si(unit.to_si(v)) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn head_and_power() {
        assert!((HeadUnit::Foot.to_si(1.0) - 0.3048).abs() < 1e-12);
        assert!((HeadUnit::Foot.from_si(0.3048) - 1.0).abs() < 1e-12);
        assert_eq!(PowerUnit::Kilowatt.to_si(2.0), 2000.0);
        assert!((PowerUnit::Horsepower.to_si(1.0) - 745.699_872).abs() < 1e-3);
        assert_eq!(EfficiencyUnit::Percent.to_si(75.0), 0.75);
    }

    #[test]
    fn serde_names() {
        let unit: FlowUnit = serde_yaml::from_str("gpm").unwrap();
        assert_eq!(unit, FlowUnit::GallonPerMinute);
        let unit: EfficiencyUnit = serde_yaml::from_str("\"%\"").unwrap();
        assert_eq!(unit, EfficiencyUnit::Percent);
        let unit: PowerUnit = serde_yaml::from_str("hp").unwrap();
        assert_eq!(unit, PowerUnit::Horsepower);
    }

    #[test]
    fn symbols_parse_case_insensitively() {
        assert_eq!("GPM".parse::<FlowUnit>(), Ok(FlowUnit::GallonPerMinute));
        assert_eq!("m3/h".parse::<FlowUnit>(), Ok(FlowUnit::CubicMeterPerHour));
        assert_eq!(" ft ".parse::<HeadUnit>(), Ok(HeadUnit::Foot));
        assert_eq!("%".parse::<EfficiencyUnit>(), Ok(EfficiencyUnit::Percent));
        assert_eq!("kW".parse::<PowerUnit>(), Ok(PowerUnit::Kilowatt));
        let err = "bar".parse::<HeadUnit>().unwrap_err();
        assert_eq!(err.quantity, "head");
        assert_eq!(err.to_string(), "Unknown head unit 'bar'");
    }
}

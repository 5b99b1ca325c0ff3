//! Linear unit conversion through a common base unit

use crate::measurement::{DimensionUnit, DurationUnit, Measurement, Unit};

/// Converts measurements between units of one family.
///
/// `result = value * base(source) / base(target)`
pub trait UnitConverter<U: Unit> {
    /// How many base units one `unit` is worth.
    fn base_value(&self, unit: U) -> f64;

    fn convert(&self, measurement: Measurement<U>, target: U) -> Measurement<U> {
        if measurement.unit == target {
            return measurement;
        }
        let in_base = measurement.value * self.base_value(measurement.unit);
        Measurement::new(in_base / self.base_value(target), target)
    }
}

/// px/rem converter; one rem is `rem_base` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionConverter {
    pub rem_base: f64,
    pub px_base: f64,
}

impl DimensionConverter {
    pub const DEFAULT_REM_BASE: f64 = 16.0;

    pub fn new(rem_base: f64, px_base: f64) -> Self {
        Self { rem_base, px_base }
    }

    pub fn with_rem_base(rem_base: f64) -> Self {
        Self {
            rem_base,
            ..Self::default()
        }
    }
}

impl Default for DimensionConverter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_REM_BASE, 1.0)
    }
}

impl UnitConverter<DimensionUnit> for DimensionConverter {
    fn base_value(&self, unit: DimensionUnit) -> f64 {
        match unit {
            DimensionUnit::Px => self.px_base,
            DimensionUnit::Rem => self.rem_base,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationConverter;

impl UnitConverter<DurationUnit> for DurationConverter {
    fn base_value(&self, unit: DurationUnit) -> f64 {
        match unit {
            DurationUnit::Millisecond => 1.0,
            DurationUnit::Second => 1000.0,
        }
    }
}

use serde::Serialize;
use std::fmt;

/// Human-readable temperature bands, bounded in Fahrenheit with the upper bound inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TempCategory {
    Freezing,
    Cold,
    Cool,
    Mild,
    Warm,
    Hot,
}

impl TempCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TempCategory::Freezing => "Freezing",
            TempCategory::Cold => "Cold",
            TempCategory::Cool => "Cool",
            TempCategory::Mild => "Mild",
            TempCategory::Warm => "Warm",
            TempCategory::Hot => "Hot",
        }
    }
}

impl fmt::Display for TempCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorize a Fahrenheit temperature.
///
/// Total over every `f64`: anything that fails the `<=` comparisons (including NaN) lands in `Hot`.
pub fn categorize_temperature(temp_fahrenheit: f64) -> TempCategory {
    match temp_fahrenheit {
        t if t <= 32.0 => TempCategory::Freezing,
        t if t <= 50.0 => TempCategory::Cold,
        t if t <= 68.0 => TempCategory::Cool,
        t if t <= 77.0 => TempCategory::Mild,
        t if t <= 95.0 => TempCategory::Warm,
        _ => TempCategory::Hot,
    }
}

/// Convert an upstream temperature to Fahrenheit.
///
/// `metric` is Celsius and `standard` is Kelvin. Any other unit (including `imperial`)
/// is assumed to be Fahrenheit already and is returned unchanged.
pub fn to_fahrenheit(temp: f64, unit: &str) -> f64 {
    match unit {
        "metric" => temp * 9.0 / 5.0 + 32.0,
        "standard" => (temp - 273.15) * 9.0 / 5.0 + 32.0,
        _ => temp,
    }
}

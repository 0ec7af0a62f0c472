//! Contract for the pressure-derivative collaborator.
//!
//! The numerical derivative itself lives outside this crate. A calculator
//! receives the table and a [`PressureDerivativeConfig`] and returns one
//! value per row; [`crate::Document::calculate_pressure_derivative`] appends
//! the result as a typed column.

use serde::{Deserialize, Serialize};
use welltab_engine::engine::{Table, TimeUnit};

/// Which columns feed the derivative, and their units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureDerivativeConfig {
    pub pressure_column: usize,
    pub time_column: usize,
    pub pressure_unit: String,
    pub time_unit: TimeUnit,
}

/// Values computed by a calculator, one slot per table row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivativeOutput {
    pub column_name: String,
    /// `None` leaves the cell empty.
    pub values: Vec<Option<f64>>,
    pub processed_rows: usize,
}

pub trait PressureDerivativeCalculator {
    /// Compute the derivative column. `progress` takes a percentage and a message.
    fn calculate(
        &mut self,
        table: &Table,
        config: &PressureDerivativeConfig,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<DerivativeOutput, String>;
}

/// Pressure unit named in a header such as `"Pressure (kPa)"`.
pub fn unit_from_header(header: &str) -> Option<&'static str> {
    let lower = header.to_lowercase();
    if lower.contains("kpa") {
        Some("kPa")
    } else if lower.contains("mpa") {
        Some("MPa")
    } else if lower.contains("psi") {
        Some("psi")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_from_header() {
        assert_eq!(unit_from_header("Pressure (kPa)"), Some("kPa"));
        assert_eq!(unit_from_header("p/MPa"), Some("MPa"));
        assert_eq!(unit_from_header("BHP psi"), Some("psi"));
        assert_eq!(unit_from_header("Pressure"), None);
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let config = PressureDerivativeConfig {
            pressure_column: 1,
            time_column: 0,
            pressure_unit: "MPa".into(),
            time_unit: TimeUnit::Hours,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["pressureColumn"], 1);
        assert_eq!(json["timeUnit"], "h");
    }
}

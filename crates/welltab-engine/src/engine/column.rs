//! Column semantics: well-test data types, units and value bounds.
//!
//! Every table column carries a [`ColumnDefinition`]. Definitions start as
//! [`ColumnDefinition::custom`] and are usually refined by
//! [`ColumnDefinition::infer`], which recognises common well-test headers in
//! English and Chinese.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    SerialNumber,
    Date,
    TimeOfDay,
    Time,
    Pressure,
    Temperature,
    FlowRate,
    Depth,
    Viscosity,
    Density,
    Permeability,
    Porosity,
    WellRadius,
    SkinFactor,
    Distance,
    Volume,
    PressureDrop,
    PressureDerivative,
    #[default]
    Custom,
}

impl ColumnType {
    pub const ALL: [ColumnType; 19] = [
        ColumnType::SerialNumber,
        ColumnType::Date,
        ColumnType::TimeOfDay,
        ColumnType::Time,
        ColumnType::Pressure,
        ColumnType::Temperature,
        ColumnType::FlowRate,
        ColumnType::Depth,
        ColumnType::Viscosity,
        ColumnType::Density,
        ColumnType::Permeability,
        ColumnType::Porosity,
        ColumnType::WellRadius,
        ColumnType::SkinFactor,
        ColumnType::Distance,
        ColumnType::Volume,
        ColumnType::PressureDrop,
        ColumnType::PressureDerivative,
        ColumnType::Custom,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ColumnType::SerialNumber => "Serial number",
            ColumnType::Date => "Date",
            ColumnType::TimeOfDay => "Time of day",
            ColumnType::Time => "Time",
            ColumnType::Pressure => "Pressure",
            ColumnType::Temperature => "Temperature",
            ColumnType::FlowRate => "Flow rate",
            ColumnType::Depth => "Depth",
            ColumnType::Viscosity => "Viscosity",
            ColumnType::Density => "Density",
            ColumnType::Permeability => "Permeability",
            ColumnType::Porosity => "Porosity",
            ColumnType::WellRadius => "Well radius",
            ColumnType::SkinFactor => "Skin factor",
            ColumnType::Distance => "Distance",
            ColumnType::Volume => "Volume",
            ColumnType::PressureDrop => "Pressure drop",
            ColumnType::PressureDerivative => "Pressure derivative",
            ColumnType::Custom => "Custom",
        }
    }

    /// Units offered for this type, most common first. `"-"` means dimensionless.
    pub fn units(self) -> &'static [&'static str] {
        match self {
            ColumnType::SerialNumber | ColumnType::Custom => &["-"],
            ColumnType::Date => &["-", "yyyy-MM-dd", "yyyy/MM/dd", "dd/MM/yyyy"],
            ColumnType::TimeOfDay => &["-", "hh:mm:ss", "hh:mm:ss.zzz", "hh:mm"],
            ColumnType::Time => &["h", "min", "s", "day", "-"],
            ColumnType::Pressure | ColumnType::PressureDrop | ColumnType::PressureDerivative => {
                &["MPa", "kPa", "Pa", "psi", "bar", "atm", "-"]
            }
            ColumnType::Temperature => &["°C", "°F", "K", "-"],
            ColumnType::FlowRate => &["m³/d", "m³/h", "L/s", "bbl/d", "ft³/d", "-"],
            ColumnType::Depth | ColumnType::Distance => &["m", "ft", "km", "mm", "-"],
            ColumnType::Viscosity => &["mPa·s", "cP", "Pa·s", "-"],
            ColumnType::Density => &["kg/m³", "g/cm³", "lb/ft³", "-"],
            ColumnType::Permeability => &["mD", "D", "μm²", "-"],
            ColumnType::Porosity => &["%", "fraction", "-"],
            ColumnType::WellRadius => &["m", "ft", "cm", "in", "-"],
            ColumnType::SkinFactor => &["dimensionless", "-"],
            ColumnType::Volume => &["m³", "L", "bbl", "ft³", "-"],
        }
    }

    /// Measured quantities: values must be numeric and inside the column bounds,
    /// and they are reformatted to the column precision on standardization.
    pub fn is_measured(self) -> bool {
        matches!(
            self,
            ColumnType::Pressure | ColumnType::Temperature | ColumnType::FlowRate | ColumnType::Time
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Semantic description of one column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_required: bool,
    pub min_value: f64,
    pub max_value: f64,
    pub decimal_places: usize,
}

impl ColumnDefinition {
    /// An untyped column: range ±999999 and three decimals.
    pub fn custom(name: impl Into<String>) -> Self {
        ColumnDefinition {
            name: name.into(),
            column_type: ColumnType::Custom,
            unit: String::new(),
            description: String::new(),
            is_required: false,
            min_value: -999_999.0,
            max_value: 999_999.0,
            decimal_places: 3,
        }
    }

    /// Guess a definition from a header.
    ///
    /// Rules are checked in order, so `"Time of flow"` is a time column and
    /// `"No"` is a serial number. Matching is case-insensitive; the
    /// single-letter forms (`t`, `p`, `q`) and `no`/`id` only match exactly.
    pub fn infer(header: &str) -> Self {
        let mut def = Self::custom(header);
        let lower = header.trim().to_lowercase();
        let has = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));

        if has(&["序号", "编号", "number"]) || lower == "no" || lower == "id" {
            def.column_type = ColumnType::SerialNumber;
            def.description = "Serial number".into();
            def.min_value = 1.0;
            def.max_value = 99_999.0;
            def.decimal_places = 0;
        } else if has(&["日期", "date", "年月日"]) {
            def.column_type = ColumnType::Date;
            def.unit = "yyyy-MM-dd".into();
            def.description = "Calendar date".into();
            def.min_value = 0.0;
            def.max_value = 0.0;
            def.decimal_places = 0;
        } else if has(&["时刻", "时分秒", "timeofday", "clock"]) {
            def.column_type = ColumnType::TimeOfDay;
            def.unit = "hh:mm:ss".into();
            def.description = "Time of day".into();
            def.min_value = 0.0;
            def.max_value = 0.0;
            def.decimal_places = 0;
        } else if has(&["time", "时间"]) || lower == "t" {
            def.column_type = ColumnType::Time;
            def.unit = "h".into();
            def.description = "Test time".into();
            def.min_value = 0.0;
            def.max_value = 10_000.0;
        } else if has(&["derivative", "导数"]) {
            def.column_type = ColumnType::PressureDerivative;
            def.unit = "MPa".into();
            def.description = "Pressure derivative".into();
            def.decimal_places = 6;
        } else if has(&["drop", "压降"]) {
            def.column_type = ColumnType::PressureDrop;
            def.unit = "MPa".into();
            def.description = "Pressure drop".into();
        } else if has(&["pressure", "压力"]) || lower == "p" {
            def.column_type = ColumnType::Pressure;
            def.unit = "MPa".into();
            def.description = "Pressure".into();
            def.min_value = 0.0;
            def.max_value = 100.0;
        } else if has(&["temp", "温度"]) {
            def.column_type = ColumnType::Temperature;
            def.unit = "°C".into();
            def.description = "Temperature".into();
            def.min_value = -50.0;
            def.max_value = 200.0;
        } else if has(&["flow", "流量"]) || lower == "q" {
            def.column_type = ColumnType::FlowRate;
            def.unit = "m³/d".into();
            def.description = "Flow rate".into();
            def.min_value = 0.0;
            def.max_value = 10_000.0;
        }

        def
    }

    /// Builder-style helper used by the derived-column operations.
    pub fn typed(
        name: impl Into<String>,
        column_type: ColumnType,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        ColumnDefinition {
            column_type,
            unit: unit.into(),
            description: description.into(),
            ..Self::custom(name)
        }
    }

    pub fn with_range(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    pub fn with_decimals(mut self, decimal_places: usize) -> Self {
        self.decimal_places = decimal_places;
        self
    }

    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min_value && value <= self.max_value
    }
}

impl Default for ColumnDefinition {
    fn default() -> Self {
        Self::custom("")
    }
}

/// A table column: the header text together with its definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub header: String,
    pub definition: ColumnDefinition,
}

impl Column {
    /// A column with a [`ColumnDefinition::custom`] definition named after the header.
    pub fn new(header: impl Into<String>) -> Self {
        let header = header.into();
        let definition = ColumnDefinition::custom(header.clone());
        Column { header, definition }
    }

    pub fn with_definition(header: impl Into<String>, definition: ColumnDefinition) -> Self {
        Column {
            header: header.into(),
            definition,
        }
    }

    /// A column whose definition is guessed from the header.
    pub fn inferred(header: impl Into<String>) -> Self {
        let header = header.into();
        let definition = ColumnDefinition::infer(&header);
        Column { header, definition }
    }

    pub fn column_type(&self) -> ColumnType {
        self.definition.column_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_pressure_headers() {
        for header in ["Pressure", "井底压力", "p", "P"] {
            let def = ColumnDefinition::infer(header);
            assert_eq!(def.column_type, ColumnType::Pressure, "{header}");
            assert_eq!(def.unit, "MPa");
            assert_eq!(def.max_value, 100.0);
        }
    }

    #[test]
    fn test_infer_rule_order() {
        assert_eq!(ColumnDefinition::infer("Date").column_type, ColumnType::Date);
        assert_eq!(ColumnDefinition::infer("Clock").column_type, ColumnType::TimeOfDay);
        assert_eq!(ColumnDefinition::infer("Elapsed time").column_type, ColumnType::Time);
        assert_eq!(ColumnDefinition::infer("Number").column_type, ColumnType::SerialNumber);
        assert_eq!(ColumnDefinition::infer("id").column_type, ColumnType::SerialNumber);
        assert_eq!(ColumnDefinition::infer("Temperature").column_type, ColumnType::Temperature);
        assert_eq!(ColumnDefinition::infer("Q").column_type, ColumnType::FlowRate);
    }

    #[test]
    fn test_infer_derived_pressure_columns() {
        assert_eq!(
            ColumnDefinition::infer("Pressure drop\\MPa").column_type,
            ColumnType::PressureDrop
        );
        let derivative = ColumnDefinition::infer("Pressure derivative");
        assert_eq!(derivative.column_type, ColumnType::PressureDerivative);
        assert_eq!(derivative.decimal_places, 6);
    }

    #[test]
    fn test_infer_single_letters_need_exact_match() {
        // "pt" contains neither keyword and is not an exact single-letter header
        assert_eq!(ColumnDefinition::infer("pt").column_type, ColumnType::Custom);
        assert_eq!(ColumnDefinition::infer("idle").column_type, ColumnType::Custom);
    }

    #[test]
    fn test_custom_defaults() {
        let def = ColumnDefinition::infer("Comment");
        assert_eq!(def.column_type, ColumnType::Custom);
        assert_eq!(def.name, "Comment");
        assert_eq!(def.min_value, -999_999.0);
        assert_eq!(def.max_value, 999_999.0);
        assert_eq!(def.decimal_places, 3);
        assert!(!def.is_required);
    }

    #[test]
    fn test_every_type_has_units() {
        for ty in ColumnType::ALL {
            assert!(!ty.units().is_empty(), "{ty}");
        }
        assert_eq!(ColumnType::Pressure.units()[0], "MPa");
    }
}

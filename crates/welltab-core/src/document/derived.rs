//! Derived columns: elapsed time, pressure drop and pressure derivative.
//!
//! Each operation inserts one typed column as a single undo step. Source
//! columns are checked before anything is inserted, and a failure after the
//! insert rolls the whole step back.

use super::Document;
use crate::derivative::{self, PressureDerivativeCalculator, PressureDerivativeConfig};
use crate::error::{Result, WellTabError};
use welltab_engine::engine::{
    Column, ColumnDefinition, ColumnType, Command, TimeUnit, format_fixed, parse_date,
    parse_number, parse_time_of_day, seconds_of_day,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Where elapsed time is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeSource {
    /// A single time-of-day column. Going backwards wraps past midnight.
    TimeOfDay { column: usize },
    /// A date column and a time-of-day column.
    DateAndTime { date_column: usize, time_column: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeConversionConfig {
    pub source: TimeSource,
    pub unit: TimeUnit,
    /// Header prefix; the unit is appended as `name\unit`.
    pub column_name: String,
}

impl TimeConversionConfig {
    pub fn new(source: TimeSource, unit: TimeUnit) -> Self {
        TimeConversionConfig {
            source,
            unit,
            column_name: "Time".to_string(),
        }
    }
}

/// Result of a derived-column operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedColumn {
    pub column_index: usize,
    pub column_name: String,
    pub processed_rows: usize,
}

impl Document {
    /// Add an elapsed-time column measured from the first row that parses.
    ///
    /// The column goes right after its source column(s). Values have three
    /// decimals; rows that do not parse are left empty and not counted.
    pub fn convert_time_column(&mut self, config: &TimeConversionConfig) -> Result<DerivedColumn> {
        let (insert_at, elapsed) = match config.source {
            TimeSource::TimeOfDay { column } => {
                self.check_column(column)?;
                (column + 1, self.elapsed_from_time_of_day(column)?)
            }
            TimeSource::DateAndTime {
                date_column,
                time_column,
            } => {
                self.check_column(date_column)?;
                self.check_column(time_column)?;
                (
                    date_column.max(time_column) + 1,
                    self.elapsed_from_date_and_time(date_column, time_column)?,
                )
            }
        };

        let unit = config.unit;
        let header = format!("{}\\{}", config.column_name, unit.label());
        let definition = ColumnDefinition::typed(&header, ColumnType::Time, unit.label(), "Elapsed time")
            .with_range(0.0, 999_999.0)
            .with_decimals(3);
        let values: Vec<Option<String>> = elapsed
            .iter()
            .map(|secs| secs.map(|s| format_fixed(unit.convert_seconds(s), 3)))
            .collect();

        let processed_rows = self.insert_derived_column(
            "Convert time column",
            insert_at,
            Column::with_definition(&header, definition),
            values,
        )?;
        tracing::info!(column = %header, index = insert_at, processed_rows, "Added elapsed time column");
        Ok(DerivedColumn {
            column_index: insert_at,
            column_name: header,
            processed_rows,
        })
    }

    fn elapsed_from_time_of_day(&self, col: usize) -> Result<Vec<Option<f64>>> {
        let times: Vec<Option<f64>> = self
            .table
            .column_texts(col)
            .map(|text| parse_time_of_day(text).map(seconds_of_day))
            .collect();
        let base = times.iter().flatten().next().copied().ok_or(WellTabError::NoBaseline)?;

        Ok(times
            .into_iter()
            .map(|t| {
                t.map(|secs| {
                    let diff = secs - base;
                    if diff < 0.0 { diff + SECONDS_PER_DAY } else { diff }
                })
            })
            .collect())
    }

    fn elapsed_from_date_and_time(&self, date_col: usize, time_col: usize) -> Result<Vec<Option<f64>>> {
        let stamps: Vec<_> = (0..self.table.row_count())
            .map(|row| {
                let date = parse_date(self.table.cell(row, date_col))?;
                let time = parse_time_of_day(self.table.cell(row, time_col))?;
                Some((date, seconds_of_day(time)))
            })
            .collect();
        let (base_date, base_secs) = stamps
            .iter()
            .flatten()
            .next()
            .copied()
            .ok_or(WellTabError::NoBaseline)?;

        Ok(stamps
            .into_iter()
            .map(|stamp| {
                stamp.map(|(date, secs)| {
                    let days = (date - base_date).num_days() as f64;
                    days * SECONDS_PER_DAY + (secs - base_secs)
                })
            })
            .collect())
    }

    /// Add `first - current` for the pressure column, right after it.
    ///
    /// Cells that do not parse count as 0. The new column keeps the pressure
    /// unit, or MPa when the column has none.
    pub fn calculate_pressure_drop(&mut self) -> Result<DerivedColumn> {
        let pressure_col = self
            .find_pressure_column()
            .ok_or(WellTabError::ColumnNotFound("pressure"))?;
        let rows = self.table.row_count();
        if rows == 0 {
            return Err(WellTabError::NotEnoughRows {
                required: 1,
                actual: 0,
            });
        }

        let unit = match self.table.definition(pressure_col) {
            Some(def) if !def.unit.is_empty() => def.unit.clone(),
            _ => "MPa".to_string(),
        };
        let pressures: Vec<f64> = self
            .table
            .column_texts(pressure_col)
            .map(|text| parse_number(text).unwrap_or(0.0))
            .collect();
        let first = pressures[0];
        let values = pressures
            .iter()
            .enumerate()
            .map(|(row, p)| {
                let dp = if row == 0 { 0.0 } else { first - p };
                Some(format_fixed(dp, 3))
            })
            .collect();

        let header = format!("Pressure drop\\{}", unit);
        let definition = ColumnDefinition::typed(
            &header,
            ColumnType::PressureDrop,
            unit,
            "Drop from the first pressure reading",
        )
        .with_decimals(3);
        let insert_at = pressure_col + 1;
        let processed_rows = self.insert_derived_column(
            "Calculate pressure drop",
            insert_at,
            Column::with_definition(&header, definition),
            values,
        )?;
        tracing::info!(column = %header, index = insert_at, processed_rows, "Added pressure drop column");
        Ok(DerivedColumn {
            column_index: insert_at,
            column_name: header,
            processed_rows,
        })
    }

    /// Run `calculator` and append its output as a pressure-derivative column.
    ///
    /// Without a config the columns are detected with
    /// [`Document::default_derivative_config`]. Needs at least three rows.
    pub fn calculate_pressure_derivative(
        &mut self,
        config: Option<PressureDerivativeConfig>,
        calculator: &mut dyn PressureDerivativeCalculator,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<DerivedColumn> {
        let config = match config {
            Some(config) => config,
            None => self.default_derivative_config()?,
        };
        self.check_column(config.pressure_column)?;
        self.check_column(config.time_column)?;
        let rows = self.table.row_count();
        if rows < 3 {
            return Err(WellTabError::NotEnoughRows {
                required: 3,
                actual: rows,
            });
        }

        progress(0, "Calculating pressure derivative");
        let output = calculator
            .calculate(&self.table, &config, progress)
            .map_err(WellTabError::Derivative)?;
        if output.values.len() != rows {
            tracing::warn!(
                expected = rows,
                actual = output.values.len(),
                "Derivative output length differs from row count"
            );
        }

        let header = if output.column_name.is_empty() {
            "Pressure derivative".to_string()
        } else {
            output.column_name.clone()
        };
        let definition = ColumnDefinition::typed(
            &header,
            ColumnType::PressureDerivative,
            &config.pressure_unit,
            "Pressure derivative",
        )
        .with_decimals(6);
        let values = (0..rows)
            .map(|row| {
                output
                    .values
                    .get(row)
                    .copied()
                    .flatten()
                    .map(|v| format_fixed(v, 6))
            })
            .collect();

        let insert_at = self.table.column_count();
        self.insert_derived_column(
            "Calculate pressure derivative",
            insert_at,
            Column::with_definition(&header, definition),
            values,
        )?;
        progress(100, "Pressure derivative added");
        tracing::info!(column = %header, index = insert_at, processed_rows = output.processed_rows, "Added pressure derivative column");
        Ok(DerivedColumn {
            column_index: insert_at,
            column_name: header,
            processed_rows: output.processed_rows,
        })
    }

    /// Detect the derivative inputs from column definitions and headers.
    pub fn default_derivative_config(&self) -> Result<PressureDerivativeConfig> {
        let pressure_column = self
            .find_pressure_column()
            .ok_or(WellTabError::ColumnNotFound("pressure"))?;
        let time_column = self
            .find_time_column()
            .ok_or(WellTabError::ColumnNotFound("time"))?;

        let header = self.table.header(pressure_column).unwrap_or_default();
        let pressure_unit = derivative::unit_from_header(header)
            .map(str::to_string)
            .or_else(|| {
                self.table
                    .definition(pressure_column)
                    .map(|d| d.unit.clone())
                    .filter(|u| !u.is_empty())
            })
            .unwrap_or_else(|| "MPa".to_string());
        let time_unit: TimeUnit = self
            .table
            .definition(time_column)
            .and_then(|d| d.unit.parse().ok())
            .unwrap_or_default();

        Ok(PressureDerivativeConfig {
            pressure_column,
            time_column,
            pressure_unit,
            time_unit,
        })
    }

    /// First column typed as pressure, else the first whose header names one.
    pub fn find_pressure_column(&self) -> Option<usize> {
        self.table
            .find_column(|c| c.column_type() == ColumnType::Pressure)
            .or_else(|| {
                self.table.find_column(|c| {
                    if matches!(
                        c.column_type(),
                        ColumnType::PressureDrop | ColumnType::PressureDerivative
                    ) {
                        return false;
                    }
                    let lower = c.header.trim().to_lowercase();
                    lower == "p" || ["pressure", "压力", "压强"].iter().any(|k| lower.contains(k))
                })
            })
    }

    /// First column typed as elapsed time, else the first whose header names one.
    pub fn find_time_column(&self) -> Option<usize> {
        self.table
            .find_column(|c| c.column_type() == ColumnType::Time)
            .or_else(|| {
                self.table.find_column(|c| {
                    let lower = c.header.trim().to_lowercase();
                    lower == "t" || lower.contains("time") || lower.contains("时间")
                })
            })
    }

    /// Insert `column` at `at` and fill it from `values` as one undo step.
    /// Returns the number of cells filled.
    fn insert_derived_column(
        &mut self,
        label: &str,
        at: usize,
        column: Column,
        values: Vec<Option<String>>,
    ) -> Result<usize> {
        self.transaction(label, |doc| {
            let count = doc.table.column_count();
            if !doc.execute(Command::insert_column(at, column)) {
                return Err(WellTabError::ColumnOutOfRange { index: at, count });
            }
            let mut filled = 0;
            for (row, value) in values.into_iter().enumerate() {
                let Some(text) = value else {
                    continue;
                };
                let cmd = Command::set_cell(&doc.table, row, at, text);
                doc.execute(cmd);
                filled += 1;
            }
            Ok(filled)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivative::DerivativeOutput;
    use welltab_engine::engine::Table;

    fn well() -> Document {
        let mut doc = Document::from_table(Table::from_rows(
            ["Clock", "Pressure"],
            [vec!["08:00:00", "30"], vec!["08:30:00", "28.5"], vec!["09:15:00", "25"]],
        ));
        doc.infer_column_definitions();
        doc
    }

    #[test]
    fn test_pressure_drop_sign_convention() {
        let mut doc = well();
        let result = doc.calculate_pressure_drop().unwrap();
        assert_eq!(result.column_index, 2);
        assert_eq!(result.column_name, "Pressure drop\\MPa");
        assert_eq!(result.processed_rows, 3);
        let drops: Vec<&str> = doc.table().column_texts(2).collect();
        assert_eq!(drops, vec!["0.000", "1.500", "5.000"]);
        assert_eq!(
            doc.column_definition(2).unwrap().column_type,
            ColumnType::PressureDrop
        );
    }

    #[test]
    fn test_pressure_drop_unparseable_is_zero() {
        let mut doc = Document::from_table(Table::from_rows(
            ["p"],
            [vec!["10"], vec!["n/a"], vec!["7"]],
        ));
        doc.calculate_pressure_drop().unwrap();
        let drops: Vec<&str> = doc.table().column_texts(1).collect();
        assert_eq!(drops, vec!["0.000", "10.000", "3.000"]);
    }

    #[test]
    fn test_pressure_drop_needs_pressure_column() {
        let mut doc = Document::from_table(Table::from_rows(["a", "b"], [vec!["1", "2"]]));
        assert!(matches!(
            doc.calculate_pressure_drop(),
            Err(WellTabError::ColumnNotFound("pressure"))
        ));
        assert_eq!(doc.column_count(), 2);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_pressure_drop_is_one_undo_step() {
        let mut doc = well();
        let before = doc.table().clone();
        doc.calculate_pressure_drop().unwrap();
        assert_eq!(doc.undo().unwrap(), "Calculate pressure drop");
        assert_eq!(doc.table(), &before);
    }

    #[test]
    fn test_convert_time_of_day_to_minutes() {
        let mut doc = well();
        let config = TimeConversionConfig::new(TimeSource::TimeOfDay { column: 0 }, TimeUnit::Minutes);
        let result = doc.convert_time_column(&config).unwrap();
        assert_eq!(result.column_index, 1);
        assert_eq!(result.column_name, "Time\\min");
        assert_eq!(result.processed_rows, 3);
        let elapsed: Vec<&str> = doc.table().column_texts(1).collect();
        assert_eq!(elapsed, vec!["0.000", "30.000", "75.000"]);
        let def = doc.column_definition(1).unwrap();
        assert_eq!(def.column_type, ColumnType::Time);
        assert_eq!(def.unit, "min");
        assert_eq!(doc.table().header(2), Some("Pressure"));
    }

    #[test]
    fn test_convert_time_wraps_midnight_and_skips_bad_rows() {
        let mut doc = Document::from_table(Table::from_rows(
            ["t"],
            [vec!["bad"], vec!["23:30:00"], vec![""], vec!["00:30:00"]],
        ));
        let config = TimeConversionConfig::new(TimeSource::TimeOfDay { column: 0 }, TimeUnit::Hours);
        let result = doc.convert_time_column(&config).unwrap();
        assert_eq!(result.processed_rows, 2);
        let elapsed: Vec<&str> = doc.table().column_texts(1).collect();
        assert_eq!(elapsed, vec!["", "0.000", "", "1.000"]);
    }

    #[test]
    fn test_convert_date_and_time_across_days() {
        let mut doc = Document::from_table(Table::from_rows(
            ["Date", "Clock", "p"],
            [
                vec!["2024-03-01", "22:00:00", "30"],
                vec!["2024-03-02", "01:00:00", "29"],
                vec!["2024/03/03", "22:00:00", "28"],
            ],
        ));
        let config = TimeConversionConfig::new(
            TimeSource::DateAndTime {
                date_column: 0,
                time_column: 1,
            },
            TimeUnit::Hours,
        );
        let result = doc.convert_time_column(&config).unwrap();
        assert_eq!(result.column_index, 2);
        let elapsed: Vec<&str> = doc.table().column_texts(2).collect();
        assert_eq!(elapsed, vec!["0.000", "3.000", "48.000"]);
        assert_eq!(doc.table().header(3), Some("p"));
    }

    #[test]
    fn test_convert_time_without_baseline_leaves_table() {
        let mut doc = Document::from_table(Table::from_rows(["t"], [vec!["x"], vec!["y"]]));
        let before = doc.table().clone();
        let config = TimeConversionConfig::new(TimeSource::TimeOfDay { column: 0 }, TimeUnit::Seconds);
        assert!(matches!(doc.convert_time_column(&config), Err(WellTabError::NoBaseline)));
        assert_eq!(doc.table(), &before);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_convert_time_bad_column() {
        let mut doc = well();
        let config = TimeConversionConfig::new(TimeSource::TimeOfDay { column: 9 }, TimeUnit::Seconds);
        assert!(matches!(
            doc.convert_time_column(&config),
            Err(WellTabError::ColumnOutOfRange { index: 9, count: 2 })
        ));
    }

    #[test]
    fn test_find_columns_by_header() {
        let doc = Document::from_table(Table::from_rows(["时间", "井底压力"], [vec!["0", "1"]]));
        assert_eq!(doc.find_time_column(), Some(0));
        assert_eq!(doc.find_pressure_column(), Some(1));
    }

    struct Slope;

    impl PressureDerivativeCalculator for Slope {
        fn calculate(
            &mut self,
            table: &Table,
            config: &PressureDerivativeConfig,
            progress: &mut dyn FnMut(u8, &str),
        ) -> std::result::Result<DerivativeOutput, String> {
            progress(50, "halfway");
            let mut values = vec![None];
            for row in 1..table.row_count() {
                let dp = parse_number(table.cell(row - 1, config.pressure_column)).unwrap_or(0.0)
                    - parse_number(table.cell(row, config.pressure_column)).unwrap_or(0.0);
                let dt = parse_number(table.cell(row, config.time_column)).unwrap_or(0.0)
                    - parse_number(table.cell(row - 1, config.time_column)).unwrap_or(0.0);
                values.push(Some(dp / dt));
            }
            Ok(DerivativeOutput {
                column_name: "dP/dt".into(),
                processed_rows: values.len() - 1,
                values,
            })
        }
    }

    struct Failing;

    impl PressureDerivativeCalculator for Failing {
        fn calculate(
            &mut self,
            _table: &Table,
            _config: &PressureDerivativeConfig,
            _progress: &mut dyn FnMut(u8, &str),
        ) -> std::result::Result<DerivativeOutput, String> {
            Err("diverged".into())
        }
    }

    fn timed() -> Document {
        let mut doc = Document::from_table(Table::from_rows(
            ["Time", "Pressure (kPa)"],
            [vec!["0", "300"], vec!["1", "290"], vec!["3", "280"]],
        ));
        doc.infer_column_definitions();
        doc
    }

    #[test]
    fn test_default_derivative_config() {
        let config = timed().default_derivative_config().unwrap();
        assert_eq!(config.time_column, 0);
        assert_eq!(config.pressure_column, 1);
        assert_eq!(config.pressure_unit, "kPa");
        assert_eq!(config.time_unit, TimeUnit::Hours);
    }

    #[test]
    fn test_pressure_derivative_appends_column() {
        let mut doc = timed();
        let mut messages = Vec::new();
        let result = doc
            .calculate_pressure_derivative(None, &mut Slope, &mut |pct, _| messages.push(pct))
            .unwrap();
        assert_eq!(result.column_index, 2);
        assert_eq!(result.column_name, "dP/dt");
        assert_eq!(result.processed_rows, 2);
        assert_eq!(messages, vec![0, 50, 100]);
        let values: Vec<&str> = doc.table().column_texts(2).collect();
        assert_eq!(values, vec!["", "10.000000", "5.000000"]);
        let def = doc.column_definition(2).unwrap();
        assert_eq!(def.column_type, ColumnType::PressureDerivative);
        assert_eq!(def.decimal_places, 6);
        assert_eq!(def.unit, "kPa");
    }

    #[test]
    fn test_pressure_derivative_failures() {
        let mut doc = timed();
        let err = doc
            .calculate_pressure_derivative(None, &mut Failing, &mut |_, _| {})
            .unwrap_err();
        assert!(matches!(err, WellTabError::Derivative(ref m) if m == "diverged"));
        assert_eq!(doc.column_count(), 2);

        let mut short = Document::from_table(Table::from_rows(
            ["t", "p"],
            [vec!["0", "1"], vec!["1", "2"]],
        ));
        assert!(matches!(
            short.calculate_pressure_derivative(None, &mut Slope, &mut |_, _| {}),
            Err(WellTabError::NotEnoughRows { required: 3, actual: 2 })
        ));
    }
}

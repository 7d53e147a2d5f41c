//! Grip-strength percentiles
//!
//! Maps a grip reading (kg) onto an age/gender-normalized percentile by linear
//! interpolation between reference anchors. The built-in tables cover adults
//! from 20 years in five-year brackets; the last bracket is open-ended.

use crate::error::ComputeError;
use crate::types::{Gender, GripStrength};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Percentiles of the reference anchors, in column order
pub const PERCENTILE_ANCHORS: [f64; 13] = [
    10.0, 30.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0, 80.0, 85.0, 90.0, 95.0, 100.0,
];

/// Returned when no bracket matches the subject
pub const FALLBACK_PERCENTILE: f64 = 50.0;

const EXACT_MATCH_TOLERANCE: f64 = 0.01;

type StandardRow = (u32, u32, [f64; 13]);

const FEMALE_ROWS: [StandardRow; 12] = [
    (20, 24, [17.3, 18.3, 21.1, 22.9, 24.3, 25.6, 26.9, 28.3, 29.9, 32.0, 33.4, 35.7, 35.8]),
    (25, 29, [17.3, 18.3, 21.2, 22.9, 24.3, 25.6, 26.9, 28.2, 29.8, 31.9, 33.3, 35.5, 35.6]),
    (30, 34, [17.5, 18.6, 21.5, 23.3, 24.7, 26.0, 27.3, 28.6, 30.2, 32.2, 33.7, 35.9, 36.0]),
    (35, 39, [17.6, 18.6, 21.7, 23.5, 24.9, 26.2, 27.5, 28.8, 30.4, 32.4, 33.8, 35.9, 36.0]),
    (40, 44, [17.6, 18.7, 21.8, 23.7, 25.1, 26.4, 27.7, 29.0, 30.5, 32.5, 33.9, 36.1, 36.2]),
    (45, 49, [17.4, 18.5, 21.5, 23.3, 24.7, 25.6, 26.9, 28.6, 30.1, 32.1, 33.5, 35.7, 35.8]),
    (50, 54, [16.8, 17.8, 20.7, 22.4, 23.8, 25.1, 26.3, 27.6, 29.1, 31.1, 32.5, 34.8, 34.9]),
    (55, 59, [16.0, 17.1, 20.0, 21.8, 23.2, 24.4, 25.6, 26.9, 28.4, 30.5, 31.9, 34.1, 34.2]),
    (60, 64, [14.5, 15.5, 18.5, 20.3, 21.7, 22.9, 24.0, 25.3, 26.7, 28.6, 30.0, 32.1, 32.2]),
    (65, 69, [13.4, 14.5, 17.6, 19.4, 20.8, 22.0, 23.2, 24.4, 25.9, 27.8, 29.2, 31.3, 31.4]),
    (70, 74, [12.2, 13.3, 16.3, 18.1, 19.5, 20.7, 21.9, 23.2, 24.6, 26.6, 28.0, 30.3, 30.4]),
    (75, 999, [11.5, 12.5, 15.6, 17.4, 18.8, 20.0, 21.2, 22.5, 24.1, 26.2, 27.7, 30.2, 30.3]),
];

const MALE_ROWS: [StandardRow; 12] = [
    (20, 24, [29.0, 30.7, 35.5, 38.3, 40.4, 42.4, 44.2, 46.2, 48.4, 51.4, 53.5, 56.6, 56.7]),
    (25, 29, [29.6, 31.4, 36.2, 39.1, 41.3, 43.2, 45.1, 47.1, 49.4, 52.4, 54.4, 57.6, 57.7]),
    (30, 34, [29.9, 31.7, 36.5, 39.3, 41.5, 43.5, 45.4, 47.3, 49.6, 52.5, 54.6, 57.7, 57.8]),
    (35, 39, [29.6, 31.4, 36.2, 38.9, 41.1, 43.1, 44.9, 46.9, 49.1, 51.9, 53.9, 56.9, 57.0]),
    (40, 44, [29.3, 31.1, 35.8, 38.6, 40.8, 42.7, 44.5, 46.5, 48.6, 51.5, 53.4, 56.3, 56.4]),
    (45, 49, [28.9, 30.6, 35.3, 38.0, 40.1, 42.0, 43.8, 45.8, 47.9, 50.7, 52.6, 55.5, 55.6]),
    (50, 54, [28.1, 29.7, 34.2, 36.9, 39.0, 40.8, 42.6, 44.5, 46.7, 49.5, 51.4, 54.4, 54.5]),
    (55, 59, [26.2, 27.8, 32.3, 35.0, 37.1, 39.0, 40.8, 42.7, 44.9, 47.7, 49.6, 52.6, 52.7]),
    (60, 64, [22.8, 24.5, 29.1, 31.8, 33.9, 35.8, 37.6, 39.5, 41.6, 44.3, 46.1, 48.9, 49.0]),
    (65, 69, [20.8, 22.5, 27.2, 30.0, 32.1, 34.0, 35.9, 37.8, 39.9, 42.7, 44.5, 47.3, 47.4]),
    (70, 74, [18.3, 20.0, 24.5, 27.2, 29.3, 31.2, 33.0, 35.0, 37.1, 39.9, 41.8, 44.6, 44.7]),
    (75, 999, [16.0, 17.5, 21.9, 24.6, 26.7, 28.6, 30.5, 32.4, 34.6, 37.5, 39.4, 42.3, 42.4]),
];

/// One age bracket for one gender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileRow {
    pub gender: Gender,
    /// Inclusive lower age bound
    pub min_age: u32,
    /// Inclusive upper age bound
    pub max_age: u32,
    /// Grip values (kg) at each anchor percentile
    pub values: Vec<f64>,
}

impl PercentileRow {
    pub fn contains(&self, gender: Gender, age: u32) -> bool {
        self.gender == gender && age >= self.min_age && age <= self.max_age
    }
}

/// Percentile reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileTable {
    pub anchors: Vec<f64>,
    pub rows: Vec<PercentileRow>,
}

impl PercentileTable {
    /// Built-in adult reference tables
    pub fn standard() -> &'static PercentileTable {
        static STANDARD: OnceLock<PercentileTable> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let rows = FEMALE_ROWS
                .iter()
                .map(|row| (Gender::Female, row))
                .chain(MALE_ROWS.iter().map(|row| (Gender::Male, row)))
                .map(|(gender, &(min_age, max_age, values))| PercentileRow {
                    gender,
                    min_age,
                    max_age,
                    values: values.to_vec(),
                })
                .collect();
            PercentileTable {
                anchors: PERCENTILE_ANCHORS.to_vec(),
                rows,
            }
        })
    }

    /// Parse and validate a table from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let table: PercentileTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Check anchor/value shape and ordering
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.anchors.len() < 2 {
            return Err(ComputeError::Validation(
                "percentile table needs at least two anchors".to_string(),
            ));
        }
        if !is_non_decreasing(&self.anchors) {
            return Err(ComputeError::Validation(
                "percentile anchors must be non-decreasing".to_string(),
            ));
        }

        for row in &self.rows {
            let name = format!("{} {}-{}", row.gender, row.min_age, row.max_age);
            if row.min_age > row.max_age {
                return Err(ComputeError::Validation(format!(
                    "row {}: age bounds are inverted",
                    name
                )));
            }
            if row.values.len() != self.anchors.len() {
                return Err(ComputeError::Validation(format!(
                    "row {}: expected {} values, found {}",
                    name,
                    self.anchors.len(),
                    row.values.len()
                )));
            }
            if row.values.iter().any(|v| !v.is_finite()) || !is_non_decreasing(&row.values) {
                return Err(ComputeError::Validation(format!(
                    "row {}: values must be finite and non-decreasing",
                    name
                )));
            }
        }
        Ok(())
    }

    /// First bracket matching the subject
    pub fn row(&self, gender: Gender, age: u32) -> Option<&PercentileRow> {
        self.rows.iter().find(|row| row.contains(gender, age))
    }

    /// Percentile of a grip reading; `FALLBACK_PERCENTILE` when no bracket matches
    pub fn percentile(&self, gender: Gender, age: u32, grip_kg: f64) -> f64 {
        let Some(row) = self.row(gender, age) else {
            debug!(%gender, age, "no grip reference bracket, using fallback percentile");
            return FALLBACK_PERCENTILE;
        };
        let values = &row.values;
        let (Some(&lowest), Some(&highest)) = (values.first(), values.last()) else {
            return FALLBACK_PERCENTILE;
        };

        if grip_kg < lowest {
            return self.anchors[0];
        }
        if grip_kg >= highest {
            return self.anchors[self.anchors.len() - 1];
        }

        for i in 0..values.len() - 1 {
            let (current, next) = (values[i], values[i + 1]);
            if grip_kg >= current && grip_kg < next {
                let ratio = (grip_kg - current) / (next - current);
                return self.anchors[i] + ratio * (self.anchors[i + 1] - self.anchors[i]);
            }
        }

        // Only reachable with repeated anchor values
        values
            .iter()
            .position(|v| (grip_kg - v).abs() < EXACT_MATCH_TOLERANCE)
            .map(|i| self.anchors[i])
            .unwrap_or(FALLBACK_PERCENTILE)
    }

    /// Percentile plus the derived risk score (`100 - percentile`)
    pub fn grip_strength(&self, gender: Gender, age: u32, grip_kg: f64) -> GripStrength {
        let percentage = self.percentile(gender, age, grip_kg);
        GripStrength {
            percentage,
            score: 100.0 - percentage,
        }
    }
}

/// Grip strength against the built-in reference tables
pub fn grip_strength(gender: Gender, age: u32, grip_kg: f64) -> GripStrength {
    PercentileTable::standard().grip_strength(gender, age, grip_kg)
}

fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

//! lookup table mapping decibels onto a 0..1 display value
//!
//! The curve expands the low end of the decibel range so quiet signal is still
//! visible on a meter.  `root` controls the curvature: 2.0 is a square root,
//! 3.0 a cube root, but it doesn't have to be integer valued.
use std::{error::Error, fmt};

use crate::utils::db_to_amp;

pub const DEFAULT_MIN_DECIBELS: f32 = -80.0;
pub const DEFAULT_TABLE_SIZE: usize = 400;
pub const DEFAULT_ROOT: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum MeterTableError {
    MinDecibelsNotNegative(f32),
    TableTooSmall(usize),
    InvalidRoot(f32),
}

impl fmt::Display for MeterTableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MeterTableError::MinDecibelsNotNegative(db) => {
                write!(f, "MeterTable min decibels must be negative, got {}", db)
            }
            MeterTableError::TableTooSmall(size) => {
                write!(f, "MeterTable needs at least 2 entries, got {}", size)
            }
            MeterTableError::InvalidRoot(root) => {
                write!(f, "MeterTable root must be positive, got {}", root)
            }
        }
    }
}

impl Error for MeterTableError {}

#[derive(Debug, Clone)]
pub struct MeterTable {
    min_decibels: f32,
    root: f32,
    scale_factor: f64,
    table: Vec<f32>,
}

impl MeterTable {
    /// Build a table.
    ///
    /// `table_size` needs to be large enough that there are no big gaps in the response.
    pub fn build(min_decibels: f32, table_size: usize, root: f32) -> Result<MeterTable, MeterTableError> {
        if !min_decibels.is_finite() || min_decibels >= 0.0 {
            return Err(MeterTableError::MinDecibelsNotNegative(min_decibels));
        }
        if table_size < 2 {
            return Err(MeterTableError::TableTooSmall(table_size));
        }
        if !root.is_finite() || root <= 0.0 {
            return Err(MeterTableError::InvalidRoot(root));
        }
        Ok(Self::compute(min_decibels, table_size, root))
    }

    fn compute(min_decibels: f32, table_size: usize, root: f32) -> MeterTable {
        let min_db = min_decibels as f64;
        let last = (table_size - 1) as f64;
        let min_amp = db_to_amp(min_db);
        let amp_range = 1.0 - min_amp;
        let rroot = 1.0 / root as f64;

        // entry i is i steps of resolution below 0 dB, the last one sits on min_decibels
        let table = (0..table_size)
            .map(|i| {
                let decibels = min_db * (i as f64 / last);
                let adj_amp = ((db_to_amp(decibels) - min_amp) / amp_range).clamp(0.0, 1.0);
                adj_amp.powf(rroot) as f32
            })
            .collect();

        MeterTable {
            min_decibels,
            root,
            scale_factor: last / min_db,
            table,
        }
    }

    pub fn value_at(&self, decibels: f32) -> f32 {
        if decibels.is_nan() || decibels <= self.min_decibels {
            return 0.0;
        }
        if decibels >= 0.0 {
            return 1.0;
        }
        let index = (decibels as f64 * self.scale_factor) as usize;
        self.table[index.min(self.table.len() - 1)]
    }

    pub fn min_decibels(&self) -> f32 {
        self.min_decibels
    }

    pub fn root(&self) -> f32 {
        self.root
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

impl Default for MeterTable {
    fn default() -> Self {
        Self::compute(DEFAULT_MIN_DECIBELS, DEFAULT_TABLE_SIZE, DEFAULT_ROOT)
    }
}

impl fmt::Display for MeterTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{ min_db: {}, size: {}, root: {} }}",
            self.min_decibels,
            self.table.len(),
            self.root
        )
    }
}

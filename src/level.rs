use crate::error::ConfigError;
use crate::maze::{grid_cells, MIN_DIMENSION};

pub const DEFAULT_LEVELS: u32 = 3;
pub const DEFAULT_BASE_ROWS: usize = 15;
pub const DEFAULT_BASE_COLS: usize = 29;
pub const DEFAULT_SIZE_STEP: usize = 6;

/// How many levels a run has and how big each level's maze is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPlan {
    pub total_levels: u32,
    pub base_rows: usize,
    pub base_cols: usize,
    pub size_step: usize,
}

impl Default for LevelPlan {
    fn default() -> Self {
        Self {
            total_levels: DEFAULT_LEVELS,
            base_rows: DEFAULT_BASE_ROWS,
            base_cols: DEFAULT_BASE_COLS,
            size_step: DEFAULT_SIZE_STEP,
        }
    }
}

impl LevelPlan {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.total_levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        if self.base_rows < MIN_DIMENSION {
            return Err(ConfigError::DimensionTooSmall {
                axis: "rows",
                value: self.base_rows,
                min: MIN_DIMENSION,
            });
        }
        if self.base_cols < MIN_DIMENSION {
            return Err(ConfigError::DimensionTooSmall {
                axis: "cols",
                value: self.base_cols,
                min: MIN_DIMENSION,
            });
        }
        // The last level is the largest; if it fits, every level does.
        let last = self.total_levels;
        let fits = (last as usize - 1)
            .checked_mul(self.size_step)
            .and_then(|grow| {
                let rows = self.base_rows.checked_add(grow)?;
                let cols = self.base_cols.checked_add(grow)?;
                grid_cells(rows, cols)
            })
            .is_some();
        if !fits {
            return Err(ConfigError::SizeOverflow { level: last });
        }
        Ok(self)
    }

    /// Requested `(rows, cols)` for a 1-based level. Sizes grow linearly and
    /// saturate instead of wrapping.
    pub fn dimensions(&self, level: u32) -> (usize, usize) {
        let grow = (level.saturating_sub(1) as usize).saturating_mul(self.size_step);
        (
            self.base_rows.saturating_add(grow),
            self.base_cols.saturating_add(grow),
        )
    }
}

use crate::lms::Lms;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One calibration point of a reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LmsRow {
    pub x: f64,
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

impl LmsRow {
    pub fn new(x: f64, l: f64, m: f64, s: f64) -> Self {
        Self { x, l, m, s }
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.x >= 0.0
            && self.l.is_finite()
            && self.m.is_finite()
            && self.s.is_finite()
            && self.m > 0.0
            && self.s > 0.0
    }

    pub fn lms(&self) -> Lms {
        Lms::new(self.l, self.m, self.s)
    }
}

/// Immutable reference table, sorted ascending and unique in x.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LmsTable {
    rows: Vec<LmsRow>,
}

impl LmsTable {
    /// Drops invalid rows, sorts by x and keeps the first row of any run of equal x.
    pub fn from_rows(rows: Vec<LmsRow>) -> Self {
        let mut rows: Vec<LmsRow> = rows.into_iter().filter(LmsRow::is_valid).collect();
        rows.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        rows.dedup_by(|later, earlier| later.x == earlier.x);
        Self { rows }
    }

    pub fn rows(&self) -> &[LmsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Covered x range, inclusive.
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.rows.first()?.x, self.rows.last()?.x))
    }

    /// LMS at `target_x`, linearly interpolated between the bracketing rows.
    ///
    /// Targets outside the table clamp to the boundary row. `None` only for an
    /// empty table.
    pub fn lms_at(&self, target_x: f64) -> Option<Lms> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;

        // NaN falls into the lower clamp
        if !(target_x > first.x) {
            return Some(first.lms());
        }
        if target_x >= last.x {
            return Some(last.lms());
        }

        // first.x < target_x < last.x, so 1 <= upper < len
        let upper = self.rows.partition_point(|row| row.x <= target_x);
        let hi = &self.rows[upper];
        let lo = &self.rows[upper - 1];

        let span = hi.x - lo.x;
        if span == 0.0 {
            return Some(lo.lms());
        }

        let t = (target_x - lo.x) / span;
        Some(Lms::new(
            lo.l + (hi.l - lo.l) * t,
            lo.m + (hi.m - lo.m) * t,
            lo.s + (hi.s - lo.s) * t,
        ))
    }
}

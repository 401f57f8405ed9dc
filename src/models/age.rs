use chrono::NaiveDate;

/// Average days per month in the WHO growth standards.
pub const DAYS_PER_MONTH: f64 = 30.4375;

/// Age in fractional months on `on`; `None` if `on` precedes birth.
pub fn age_in_months(date_of_birth: NaiveDate, on: NaiveDate) -> Option<f64> {
    let days = (on - date_of_birth).num_days();
    if days < 0 {
        return None;
    }
    Some(days as f64 / DAYS_PER_MONTH)
}

use chrono::NaiveDate;

pub mod fetch;
pub mod transform;

/// The unmodified body of the top page views endpoint for one day.
pub struct RawReport {
    pub date: NaiveDate,
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawReport {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

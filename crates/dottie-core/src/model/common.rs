use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dottie_api::timestamp::serde_wrapper;

/// The instant a source group's server-side cache was last flushed.
///
/// The upstream returns a bare date string, not an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlushDate(#[serde(deserialize_with = "serde_wrapper::deserialize")] pub DateTime<Utc>);

impl FlushDate {
    pub fn instant(self) -> DateTime<Utc> {
        self.0
    }
}

/// A point on the state highway network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoadwayLocation {
    pub description: Option<String>,
    pub direction: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub mile_post: f64,
    pub road_name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flush_date_accepts_both_formats() {
        let raw: FlushDate = serde_json::from_value(json!("/Date(1700000000000-0800)/")).unwrap();
        let native: FlushDate =
            serde_json::from_value(json!("2023-11-14T14:13:20.000-08:00")).unwrap();
        assert_eq!(raw, native);
        assert_eq!(raw.instant().timestamp_millis(), 1_700_000_000_000);
    }
}

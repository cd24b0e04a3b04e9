use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dottie_api::timestamp::serde_wrapper;

/// Live position and status of one vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VesselLocation {
    #[serde(rename = "VesselID")]
    pub vessel_id: i32,
    pub vessel_name: String,
    #[serde(rename = "DepartingTerminalID")]
    pub departing_terminal_id: Option<i32>,
    pub departing_terminal_name: Option<String>,
    #[serde(rename = "ArrivingTerminalID")]
    pub arriving_terminal_id: Option<i32>,
    pub arriving_terminal_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub heading: f64,
    pub in_service: bool,
    pub at_dock: bool,
    #[serde(default, deserialize_with = "serde_wrapper::option::deserialize")]
    pub left_dock: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_wrapper::option::deserialize")]
    pub eta: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_wrapper::option::deserialize")]
    pub scheduled_departure: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "serde_wrapper::deserialize")]
    pub time_stamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_docked_vessel() {
        let vessel: VesselLocation = serde_json::from_value(json!({
            "VesselID": 2,
            "VesselName": "Chelan",
            "DepartingTerminalID": 1,
            "DepartingTerminalName": "Anacortes",
            "ArrivingTerminalID": null,
            "ArrivingTerminalName": null,
            "Latitude": 48.507,
            "Longitude": -122.677,
            "Speed": 0.0,
            "Heading": 256,
            "InService": true,
            "AtDock": true,
            "LeftDock": null,
            "Eta": null,
            "ScheduledDeparture": "/Date(1640995200000-0800)/",
            "TimeStamp": "/Date(1640995100000-0800)/"
        }))
        .unwrap();

        assert_eq!(vessel.vessel_id, 2);
        assert!(vessel.at_dock);
        assert!(vessel.left_dock.is_none());
        assert_eq!(
            vessel.scheduled_departure.unwrap().timestamp_millis(),
            1_640_995_200_000
        );
    }
}

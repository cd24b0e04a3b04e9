use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use dottie_api::timestamp::serde_wrapper;

use super::common::RoadwayLocation;

/// One loop-detector flow reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficFlow {
    #[serde(rename = "FlowDataID")]
    pub flow_data_id: i64,
    /// 0 unknown, 1 wide open, 2 moderate, 3 heavy, 4 stop and go.
    pub flow_reading_value: i32,
    pub flow_station_location: Option<RoadwayLocation>,
    pub region: Option<String>,
    pub station_name: Option<String>,
    #[serde(deserialize_with = "serde_wrapper::deserialize")]
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TravelTime {
    #[serde(rename = "TravelTimeID")]
    pub travel_time_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub average_time: i32,
    pub current_time: i32,
    pub distance: f64,
    pub start_point: Option<RoadwayLocation>,
    pub end_point: Option<RoadwayLocation>,
    #[serde(deserialize_with = "serde_wrapper::deserialize")]
    pub time_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HighwayAlert {
    #[serde(rename = "AlertID")]
    pub alert_id: i64,
    pub headline_description: Option<String>,
    pub extended_description: Option<String>,
    pub event_category: Option<String>,
    pub event_status: Option<String>,
    pub priority: Option<String>,
    pub region: Option<String>,
    pub county: Option<String>,
    pub start_roadway_location: Option<RoadwayLocation>,
    pub end_roadway_location: Option<RoadwayLocation>,
    #[serde(deserialize_with = "serde_wrapper::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "serde_wrapper::option::deserialize")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "serde_wrapper::deserialize")]
    pub last_updated_time: DateTime<Utc>,
}

/// Optional filters for highway alert searches. Unset filters are
/// dropped from the request URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertSearch {
    pub state_route: Option<String>,
    pub region: Option<String>,
    pub search_time_start: Option<NaiveDate>,
    pub search_time_end: Option<NaiveDate>,
    pub starting_milepost: Option<f64>,
    pub ending_milepost: Option<f64>,
}

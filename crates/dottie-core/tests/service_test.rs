#![allow(clippy::unwrap_used)]
// Integration tests for the `Dottie` facade using wiremock.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dottie_api::{Client, ClientConfig, ErrorKind, FetchMode, Params, RuntimeEnvironment, SecretString};
use dottie_core::{
    AlertSearch, BroadcastInvalidator, CacheFlushPoller, CoreError, Dottie, SourceGroup,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Dottie) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(SecretString::from("abc".to_owned()))
        .with_base_url(Url::parse(&server.uri()).unwrap());
    let client = Client::with_environment(config, RuntimeEnvironment::Test).unwrap();
    (server, Dottie::new(client))
}

async fn mount_flush_date(server: &MockServer, group: &str, wrapper: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/ferries/api/{group}/rest/cacheflushdate")))
        .and(query_param("apiaccesscode", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(wrapper)))
        .mount(server)
        .await;
}

// ── Ferries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cache_flush_date() {
    let (server, dottie) = setup().await;
    mount_flush_date(&server, "vessels", "/Date(1700000000000-0800)/").await;

    let flushed = dottie.cache_flush_date(SourceGroup::Vessels).await.unwrap();
    assert_eq!(flushed.timestamp_millis(), 1_700_000_000_000);
}

#[tokio::test]
async fn test_vessel_locations() {
    let (server, dottie) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ferries/api/vessels/rest/vessellocations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "VesselID": 1,
            "VesselName": "Cathlamet",
            "DepartingTerminalID": 7,
            "DepartingTerminalName": "Seattle",
            "ArrivingTerminalID": 3,
            "ArrivingTerminalName": "Bainbridge Island",
            "Latitude": 47.6,
            "Longitude": -122.4,
            "Speed": 15.2,
            "Heading": 270,
            "InService": true,
            "AtDock": false,
            "LeftDock": "/Date(1640995200000-0800)/",
            "Eta": "/Date(1640997000000-0800)/",
            "ScheduledDeparture": "/Date(1640995200000-0800)/",
            "TimeStamp": "/Date(1640995500000-0800)/"
        }])))
        .mount(&server)
        .await;

    let vessels = dottie.vessel_locations().await.unwrap();
    assert_eq!(vessels.len(), 1);
    assert_eq!(vessels[0].vessel_name, "Cathlamet");
    assert_eq!(
        vessels[0].eta.unwrap().timestamp_millis(),
        1_640_997_000_000
    );
}

#[tokio::test]
async fn test_schedule_routes_formats_trip_date() {
    let (server, dottie) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ferries/api/schedule/rest/routes/2024-03-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let routes = dottie
        .schedule_routes(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        .await
        .unwrap();
    assert_eq!(routes, json!([]));
}

// ── Traffic ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_traffic_flow_by_id() {
    let (server, dottie) = setup().await;

    Mock::given(method("GET"))
        .and(path("/Traffic/api/TrafficFlow/TrafficFlowREST.svc/GetTrafficFlowAsJson"))
        .and(query_param("FlowDataID", "2482"))
        .and(query_param("accesscode", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FlowDataID": 2482,
            "FlowReadingValue": 2,
            "FlowStationLocation": null,
            "Region": "Olympic",
            "StationName": "005es11050:_MN_Stn",
            "Time": "/Date(1640995200000-0800)/"
        })))
        .mount(&server)
        .await;

    let flow = dottie.traffic_flow(2482).await.unwrap();
    assert_eq!(flow.flow_reading_value, 2);
    assert_eq!(flow.region.as_deref(), Some("Olympic"));
}

#[tokio::test]
async fn test_search_alerts_drops_unset_filters() {
    let (server, dottie) = setup().await;

    Mock::given(method("GET"))
        .and(path("/Traffic/api/HighwayAlerts/HighwayAlertsREST.svc/SearchAlertsAsJson"))
        .and(query_param("StateRoute", "005"))
        .and(query_param("SearchTimeStart", "2024-01-01"))
        .and(query_param_is_missing("Region"))
        .and(query_param_is_missing("EndingMilepost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let search = AlertSearch {
        state_route: Some("005".into()),
        search_time_start: NaiveDate::from_ymd_opt(2024, 1, 1),
        ..AlertSearch::default()
    };
    let alerts = dottie.search_alerts(&search).await.unwrap();
    assert!(alerts.is_empty());
}

// ── Lookup and errors ───────────────────────────────────────────────

#[tokio::test]
async fn test_call_by_id_in_raw_mode() {
    let (server, dottie) = setup().await;
    mount_flush_date(&server, "fares", "/Date(1700000000000)/").await;

    let raw = dottie
        .call("ferries.fares.cacheFlushDate", &Params::new(), FetchMode::Raw)
        .await
        .unwrap();
    assert_eq!(raw, json!("/Date(1700000000000)/"));
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let (_server, dottie) = setup().await;

    let err = dottie
        .call("ferries.nope", &Params::new(), FetchMode::Native)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownEndpoint { .. }));
}

#[tokio::test]
async fn test_upstream_failure_keeps_classification() {
    let (server, dottie) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ferries/api/terminals/rest/cacheflushdate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = dottie
        .cache_flush_date(SourceGroup::Terminals)
        .await
        .unwrap_err();
    assert_eq!(err.api_kind(), Some(ErrorKind::Api));
}

// ── Poller over HTTP ────────────────────────────────────────────────

#[tokio::test]
async fn test_poller_over_http_baseline_round() {
    let (server, dottie) = setup().await;
    for group in ["vessels", "terminals", "schedule", "fares"] {
        mount_flush_date(&server, group, "/Date(1700000000000)/").await;
    }

    let invalidator = Arc::new(BroadcastInvalidator::new());
    let mut rx = invalidator.subscribe();
    let mut poller =
        CacheFlushPoller::new(Arc::new(dottie), invalidator).with_interval(Duration::from_secs(60));

    let first = poller.poll_once().await;
    let second = poller.poll_once().await;

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 4);
    assert!(rx.try_recv().is_err());
}

// ── Service facade ──
//
// Typed entry points over the request pipeline. Every method is a thin
// wrapper: pick a catalog descriptor, convert inputs into `Params`, and let
// the pipeline do the rest.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use dottie_api::{Client, EndpointDescriptor, FetchMode, Params};

use crate::catalog::{self, endpoints};
use crate::error::CoreError;
use crate::group::SourceGroup;
use crate::model::{
    AlertSearch, FlushDate, HighwayAlert, TrafficFlow, TravelTime, VesselLocation,
};
use crate::poller::FlushMarkerSource;

/// High-level handle to the WSDOT services. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Dottie {
    client: Client,
}

impl Dottie {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Call a catalog endpoint by id and return its JSON payload.
    pub async fn call(&self, id: &str, params: &Params, mode: FetchMode) -> Result<Value, CoreError> {
        let descriptor = catalog::find(id).ok_or_else(|| CoreError::UnknownEndpoint {
            id: id.to_owned(),
        })?;
        self.call_descriptor(descriptor, params, mode).await
    }

    pub async fn call_descriptor(
        &self,
        descriptor: &EndpointDescriptor,
        params: &Params,
        mode: FetchMode,
    ) -> Result<Value, CoreError> {
        Ok(self.client.execute(descriptor, params, mode).await?)
    }

    // ── Ferries ──────────────────────────────────────────────────────

    pub async fn cache_flush_date(&self, group: SourceGroup) -> Result<DateTime<Utc>, CoreError> {
        let date: FlushDate = self
            .client
            .fetch(group.flush_endpoint(), &Params::new())
            .await?;
        Ok(date.instant())
    }

    pub async fn vessel_locations(&self) -> Result<Vec<VesselLocation>, CoreError> {
        Ok(self
            .client
            .fetch(&endpoints::VESSEL_LOCATIONS, &Params::new())
            .await?)
    }

    pub async fn vessel_location(&self, vessel_id: i32) -> Result<VesselLocation, CoreError> {
        let params = Params::new().with("VesselID", vessel_id);
        Ok(self
            .client
            .fetch(&endpoints::VESSEL_LOCATION_BY_ID, &params)
            .await?)
    }

    /// Routes for a sailing day, untyped.
    pub async fn schedule_routes(&self, trip_date: NaiveDate) -> Result<Value, CoreError> {
        let params = Params::new().with("TripDate", trip_date);
        self.call_descriptor(&endpoints::SCHEDULE_ROUTES, &params, FetchMode::Native)
            .await
    }

    // ── Traffic ──────────────────────────────────────────────────────

    pub async fn traffic_flows(&self) -> Result<Vec<TrafficFlow>, CoreError> {
        Ok(self
            .client
            .fetch(&endpoints::TRAFFIC_FLOWS, &Params::new())
            .await?)
    }

    pub async fn traffic_flow(&self, flow_data_id: i64) -> Result<TrafficFlow, CoreError> {
        let params = Params::new().with("FlowDataID", flow_data_id);
        Ok(self
            .client
            .fetch(&endpoints::TRAFFIC_FLOW_BY_ID, &params)
            .await?)
    }

    pub async fn travel_times(&self) -> Result<Vec<TravelTime>, CoreError> {
        Ok(self
            .client
            .fetch(&endpoints::TRAVEL_TIMES, &Params::new())
            .await?)
    }

    pub async fn highway_alerts(&self) -> Result<Vec<HighwayAlert>, CoreError> {
        Ok(self
            .client
            .fetch(&endpoints::HIGHWAY_ALERTS, &Params::new())
            .await?)
    }

    pub async fn search_alerts(&self, search: &AlertSearch) -> Result<Vec<HighwayAlert>, CoreError> {
        let params = Params::from_serialize(search)?;
        Ok(self.client.fetch(&endpoints::SEARCH_ALERTS, &params).await?)
    }
}

impl FlushMarkerSource for Dottie {
    async fn flush_marker(&self, group: SourceGroup) -> Result<DateTime<Utc>, CoreError> {
        self.cache_flush_date(group).await
    }
}

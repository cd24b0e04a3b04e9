// ── Endpoint catalog ──
//
// Static descriptors for the operations this crate knows how to call.
// Placeholder names match the upstream query parameter names so typed
// inputs can be serialized straight into `Params`.

use dottie_api::EndpointDescriptor;

pub mod endpoints {
    use dottie_api::EndpointDescriptor;

    // Ferries: cache flush markers
    pub const VESSELS_CACHE_FLUSH_DATE: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.vessels.cacheFlushDate",
        "/ferries/api/vessels/rest/cacheflushdate",
    );
    pub const TERMINALS_CACHE_FLUSH_DATE: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.terminals.cacheFlushDate",
        "/ferries/api/terminals/rest/cacheflushdate",
    );
    pub const SCHEDULE_CACHE_FLUSH_DATE: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.schedule.cacheFlushDate",
        "/ferries/api/schedule/rest/cacheflushdate",
    );
    pub const FARES_CACHE_FLUSH_DATE: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.fares.cacheFlushDate",
        "/ferries/api/fares/rest/cacheflushdate",
    );

    // Ferries: data
    pub const VESSEL_LOCATIONS: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.vesselLocations",
        "/ferries/api/vessels/rest/vessellocations",
    );
    pub const VESSEL_LOCATION_BY_ID: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.vesselLocationById",
        "/ferries/api/vessels/rest/vessellocations/{VesselID}",
    );
    pub const VESSEL_BASICS: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.vesselBasics",
        "/ferries/api/vessels/rest/vesselbasics",
    );
    pub const TERMINAL_BASICS: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.terminalBasics",
        "/ferries/api/terminals/rest/terminalbasics",
    );
    pub const SCHEDULE_ROUTES: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.scheduleRoutes",
        "/ferries/api/schedule/rest/routes/{TripDate}",
    );
    pub const FARES_TERMINALS: EndpointDescriptor = EndpointDescriptor::new(
        "ferries.faresTerminals",
        "/ferries/api/fares/rest/terminals/{TripDate}",
    );

    // Traffic
    pub const TRAFFIC_FLOWS: EndpointDescriptor = EndpointDescriptor::new(
        "traffic.trafficFlows",
        "/Traffic/api/TrafficFlow/TrafficFlowREST.svc/GetTrafficFlowsAsJson",
    );
    pub const TRAFFIC_FLOW_BY_ID: EndpointDescriptor = EndpointDescriptor::new(
        "traffic.trafficFlowById",
        "/Traffic/api/TrafficFlow/TrafficFlowREST.svc/GetTrafficFlowAsJson?FlowDataID={FlowDataID}",
    );
    pub const TRAVEL_TIMES: EndpointDescriptor = EndpointDescriptor::new(
        "traffic.travelTimes",
        "/Traffic/api/TravelTimes/TravelTimesREST.svc/GetTravelTimesAsJson",
    );
    pub const HIGHWAY_ALERTS: EndpointDescriptor = EndpointDescriptor::new(
        "traffic.highwayAlerts",
        "/Traffic/api/HighwayAlerts/HighwayAlertsREST.svc/GetAlertsAsJson",
    );
    pub const SEARCH_ALERTS: EndpointDescriptor = EndpointDescriptor::new(
        "traffic.searchAlerts",
        "/Traffic/api/HighwayAlerts/HighwayAlertsREST.svc/SearchAlertsAsJson?StateRoute={StateRoute}&Region={Region}&SearchTimeStart={SearchTimeStart}&SearchTimeEnd={SearchTimeEnd}&StartingMilepost={StartingMilepost}&EndingMilepost={EndingMilepost}",
    );
    pub const BORDER_CROSSINGS: EndpointDescriptor = EndpointDescriptor::new(
        "traffic.borderCrossings",
        "/Traffic/api/BorderCrossings/BorderCrossingsREST.svc/GetBorderCrossingsAsJson",
    );
}

/// Every known endpoint, in display order.
pub const ALL: &[EndpointDescriptor] = &[
    endpoints::VESSELS_CACHE_FLUSH_DATE,
    endpoints::TERMINALS_CACHE_FLUSH_DATE,
    endpoints::SCHEDULE_CACHE_FLUSH_DATE,
    endpoints::FARES_CACHE_FLUSH_DATE,
    endpoints::VESSEL_LOCATIONS,
    endpoints::VESSEL_LOCATION_BY_ID,
    endpoints::VESSEL_BASICS,
    endpoints::TERMINAL_BASICS,
    endpoints::SCHEDULE_ROUTES,
    endpoints::FARES_TERMINALS,
    endpoints::TRAFFIC_FLOWS,
    endpoints::TRAFFIC_FLOW_BY_ID,
    endpoints::TRAVEL_TIMES,
    endpoints::HIGHWAY_ALERTS,
    endpoints::SEARCH_ALERTS,
    endpoints::BORDER_CROSSINGS,
];

/// Look up a descriptor by id (case-insensitive).
pub fn find(id: &str) -> Option<&'static EndpointDescriptor> {
    ALL.iter().find(|d| d.id().eq_ignore_ascii_case(id))
}

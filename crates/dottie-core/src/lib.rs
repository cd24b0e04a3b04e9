// dottie-core: Endpoint catalog, typed models, and cache invalidation on
// top of the dottie-api pipeline.

pub mod catalog;
pub mod error;
pub mod group;
pub mod invalidate;
pub mod model;
pub mod poller;
pub mod service;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use group::SourceGroup;
pub use invalidate::{BroadcastInvalidator, CacheInvalidator};
pub use poller::{
    CacheFlushPoller, DEFAULT_POLL_INTERVAL, FlushMarkerSource, FlushTracker, MarkerSnapshot,
    Observation, PollerHandle,
};
pub use service::Dottie;

pub use model::{
    AlertSearch, FlushDate, HighwayAlert, RoadwayLocation, TrafficFlow, TravelTime,
    VesselLocation,
};

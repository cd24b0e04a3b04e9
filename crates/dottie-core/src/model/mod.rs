// ── Typed upstream models ──
//
// Field names follow the upstream PascalCase JSON. Date fields accept both
// the wrapper format and RFC 3339, so they deserialize from raw and
// normalized payloads alike.

pub mod common;
pub mod ferries;
pub mod traffic;

pub use common::{FlushDate, RoadwayLocation};
pub use ferries::VesselLocation;
pub use traffic::{AlertSearch, HighwayAlert, TrafficFlow, TravelTime};

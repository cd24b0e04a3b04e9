use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use dottie_api::EndpointDescriptor;

use crate::catalog::endpoints;

/// A family of upstream data that shares one cache-flush marker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceGroup {
    Vessels,
    Terminals,
    Schedule,
    Fares,
}

impl SourceGroup {
    /// The endpoint that reports this group's last cache flush.
    pub fn flush_endpoint(self) -> &'static EndpointDescriptor {
        match self {
            Self::Vessels => &endpoints::VESSELS_CACHE_FLUSH_DATE,
            Self::Terminals => &endpoints::TERMINALS_CACHE_FLUSH_DATE,
            Self::Schedule => &endpoints::SCHEDULE_CACHE_FLUSH_DATE,
            Self::Fares => &endpoints::FARES_CACHE_FLUSH_DATE,
        }
    }
}

//! Stop identities and arena handles
//!
//! A stop is identified by its numeric id together with the layer it lives on.
//! Coordinates travel with the identity but never take part in equality, so a
//! lookup key can be built from id and mode alone.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Layer a stop belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Base pedestrian network (tagged `none`)
    #[serde(rename = "none")]
    Base,
    /// Bus overlay
    Bus,
    /// Subway overlay
    Subway,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Base => "none",
            Mode::Bus => "bus",
            Mode::Subway => "subway",
        }
    }

    #[inline]
    pub fn is_overlay(&self) -> bool {
        !matches!(self, Mode::Base)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key for a stop: `(id, mode)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StopKey {
    pub id: i64,
    pub mode: Mode,
}

impl StopKey {
    pub fn new(id: i64, mode: Mode) -> Self {
        Self { id, mode }
    }

    /// Key of a base network stop
    pub fn base(id: i64) -> Self {
        Self::new(id, Mode::Base)
    }
}

impl fmt::Display for StopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Base => write!(f, "{}", self.id),
            mode => write!(f, "{}@{}", self.id, mode),
        }
    }
}

/// A geocoded stop
///
/// Equality and hashing only consider `id` and `mode`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StopIdentity {
    pub id: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub mode: Mode,
}

impl StopIdentity {
    pub fn new(id: i64, longitude: f64, latitude: f64, mode: Mode) -> Self {
        Self {
            id,
            longitude,
            latitude,
            mode,
        }
    }

    /// Base network stop
    pub fn base(id: i64, longitude: f64, latitude: f64) -> Self {
        Self::new(id, longitude, latitude, Mode::Base)
    }

    /// Same place, different layer
    pub fn on_layer(&self, mode: Mode) -> Self {
        Self { mode, ..*self }
    }

    #[inline]
    pub fn key(&self) -> StopKey {
        StopKey::new(self.id, self.mode)
    }

    /// Great-circle distance to another stop in kilometers
    pub fn distance_km(&self, other: &StopIdentity) -> f64 {
        crate::core::geo::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl PartialEq for StopIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.mode == other.mode
    }
}

impl Eq for StopIdentity {}

impl Hash for StopIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for StopIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key().fmt(f)
    }
}

impl From<StopIdentity> for StopKey {
    fn from(stop: StopIdentity) -> Self {
        stop.key()
    }
}

impl From<&StopIdentity> for StopKey {
    fn from(stop: &StopIdentity) -> Self {
        stop.key()
    }
}

impl From<&StopKey> for StopKey {
    fn from(key: &StopKey) -> Self {
        *key
    }
}

/// Stable handle of a vertex inside its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

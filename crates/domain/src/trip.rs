//! Provider profiles, MDS version dispatch, geo layers, and the trip record.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MdsError;

/// The three MDS protocol variants this pipeline speaks. Modeled as a closed
/// enum rather than a client class hierarchy: the only thing that varies
/// between versions is parameter naming, which is plain data
/// (`ProviderProfile::param_overrides` plus each variant's built-in schema),
/// not behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MdsVersion {
    #[serde(rename = "0.2.0")]
    V020,
    #[serde(rename = "0.3.0")]
    V030,
    #[serde(rename = "0.4.0")]
    V040,
}

impl MdsVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            MdsVersion::V020 => "0.2.0",
            MdsVersion::V030 => "0.3.0",
            MdsVersion::V040 => "0.4.0",
        }
    }
}

impl fmt::Display for MdsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MdsVersion {
    type Err = MdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0.2.0" => Ok(MdsVersion::V020),
            "0.3.0" => Ok(MdsVersion::V030),
            "0.4.0" => Ok(MdsVersion::V040),
            other => Err(MdsError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Authentication method a provider profile selects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ProviderAuth {
    OAuth { client_id: String, client_secret: String, token_url: String },
    Bearer { token: String },
    Basic { username: String, password: String },
    Custom { headers: HashMap<String, String> },
}

/// Static, per-run configuration for one provider, hydrated by `ConfigStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub name: String,
    pub mds_version: MdsVersion,
    pub api_base_url: String,
    pub auth: ProviderAuth,
    #[serde(default)]
    pub param_overrides: HashMap<String, String>,
    #[serde(default)]
    pub paging_enabled: bool,
    #[serde(default)]
    pub delay_seconds: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

/// The three static GeoJSON layers `GeoEnricher` indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoLayer {
    CensusTracts,
    CouncilDistricts,
    HexGrid,
}

impl GeoLayer {
    /// The stable GeoJSON feature property carrying this layer's identifier.
    pub fn identifier_property(self) -> &'static str {
        match self {
            GeoLayer::CensusTracts => "GEOID10",
            GeoLayer::CouncilDistricts => "district_n",
            GeoLayer::HexGrid => "id",
        }
    }

    pub fn all() -> [GeoLayer; 3] {
        [GeoLayer::CensusTracts, GeoLayer::CouncilDistricts, GeoLayer::HexGrid]
    }
}

/// An identifier that may arrive from a provider as either a string or an
/// integer (VeoRide sends integer `trip_id`/`device_id`/`vehicle_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IdValue {
    Str(String),
    Int(i64),
}

impl IdValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IdValue::Int(n) => Some(*n),
            IdValue::Str(s) => s.parse().ok(),
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            IdValue::Str(s) => s.clone(),
            IdValue::Int(n) => n.to_string(),
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// A trip record as it moves through validation, coordinate extraction,
/// geo-enrichment, and mutation rendering. Fields absent at extraction time
/// are populated in place by `TripModel`, matching the original system's
/// mutate-one-dict approach without giving up a typed schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub provider_id: String,
    pub provider_name: String,
    pub device_id: IdValue,
    pub vehicle_id: IdValue,
    pub vehicle_type: String,
    pub trip_id: IdValue,
    pub propulsion_type: Vec<String>,
    /// Raw GeoJSON `FeatureCollection` with at least two point features.
    pub route: serde_json::Value,
    pub trip_duration: f64,
    pub trip_distance: f64,
    pub accuracy: f64,
    /// UNIX epoch, possibly with millisecond precision.
    pub start_time: i64,
    /// UNIX epoch, possibly with millisecond precision.
    pub end_time: i64,

    #[serde(default)]
    pub standard_cost: Option<f64>,
    #[serde(default)]
    pub actual_cost: Option<f64>,
    #[serde(default)]
    pub publication_time: Option<i64>,
    #[serde(default)]
    pub parking_verification_url: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,

    // Enrichment fields, populated by `TripModel::new`.
    #[serde(default)]
    pub start_latitude: Option<f64>,
    #[serde(default)]
    pub start_longitude: Option<f64>,
    #[serde(default)]
    pub end_latitude: Option<f64>,
    #[serde(default)]
    pub end_longitude: Option<f64>,
    #[serde(default)]
    pub council_district_start: Option<String>,
    #[serde(default)]
    pub council_district_end: Option<String>,
    #[serde(default)]
    pub census_geoid_start: Option<String>,
    #[serde(default)]
    pub census_geoid_end: Option<String>,
    #[serde(default)]
    pub orig_cell_id: Option<String>,
    #[serde(default)]
    pub dest_cell_id: Option<String>,
}

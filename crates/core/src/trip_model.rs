//! Trip validation, timestamp normalization, coordinate extraction, geo
//! enrichment, and mutation rendering — the pure logic the original system
//! kept on its `MDSTrip` class, here split out from any I/O.

use chrono::{Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use mds_domain::{GeoLayer, IdValue, MdsError, Result, Trip};
use uuid::Uuid;

use crate::graphql_value::GraphQlValue;
use crate::ports::GeoEnricherPort;

/// Collects every validation failure found on a trip rather than
/// short-circuiting on the first one, so callers can report all of them at
/// once the way the original system's `get_validation_errors()` did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn is_ok(&self) -> bool {
        self.0.is_empty()
    }
}

/// Checks the structural invariants a trip must hold before it can be
/// rendered into a mutation: non-empty identifiers, a route with at least
/// two point features, and non-negative duration/distance.
pub fn validate(trip: &Trip) -> ValidationErrors {
    let mut errors = Vec::new();

    if trip.provider_id.trim().is_empty() {
        errors.push("provider_id must not be empty".to_string());
    }
    if trip.trip_duration < 0.0 {
        errors.push("trip_duration must not be negative".to_string());
    }
    if trip.trip_distance < 0.0 {
        errors.push("trip_distance must not be negative".to_string());
    }
    if trip.start_time > trip.end_time {
        errors.push("start_time must not be after end_time".to_string());
    }

    let features = trip.route.get("features").and_then(|f| f.as_array());
    match features {
        Some(features) if features.len() >= 2 => {}
        _ => errors.push("route must contain at least two point features".to_string()),
    }

    ValidationErrors(errors)
}

/// Extracts `(longitude, latitude)` from the first or last feature of a
/// trip's route `FeatureCollection`.
pub fn route_coordinates(trip: &Trip, start: bool) -> Option<(f64, f64)> {
    let features = trip.route.get("features")?.as_array()?;
    let feature = if start { features.first() } else { features.last() }?;
    let coords = feature.get("geometry")?.get("coordinates")?.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    Some((lon, lat))
}

/// Truncates a UNIX epoch value that may carry millisecond precision down to
/// 10 digits (whole seconds), then formats it as
/// `"YYYY-MM-DD HH:MM:SS <zone abbreviation>"` in the given zone.
pub fn format_timestamp(epoch: i64, zone: Tz) -> String {
    let truncated = truncate_to_ten_digits(epoch);
    let dt = Utc
        .timestamp_opt(truncated, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().unwrap_or_default());
    let local = dt.with_timezone(&zone);
    format!("{} {}", local.format("%Y-%m-%d %H:%M:%S"), zone)
}

fn truncate_to_ten_digits(epoch: i64) -> i64 {
    let digits = epoch.unsigned_abs().to_string();
    if digits.len() <= 10 {
        return epoch;
    }
    let sign = if epoch < 0 { -1 } else { 1 };
    let truncated: String = digits.chars().take(10).collect();
    sign * truncated.parse::<i64>().unwrap_or(0)
}

/// Applies optional-field defaulting the way the original mutation renderer
/// did: null costs become `"0"`, null `publication_time`/
/// `parking_verification_url` stay null.
pub fn default_optional_fields(trip: &mut Trip) {
    if trip.standard_cost.is_none() {
        trip.standard_cost = Some(0.0);
    }
    if trip.actual_cost.is_none() {
        trip.actual_cost = Some(0.0);
    }
}

/// Populates every enrichment field on `trip` from its route's start/end
/// coordinates, looking each up against all three geo layers. Best-effort:
/// any missing coordinate or lookup failure leaves the corresponding fields
/// `None`, matching the original's "wrap every enrichment call in a bare
/// except and move on" behavior.
pub fn enrich(trip: &mut Trip, geo: &dyn GeoEnricherPort) {
    if let Some((lon, lat)) = route_coordinates(trip, true) {
        trip.start_longitude = Some(lon);
        trip.start_latitude = Some(lat);
        trip.council_district_start = geo.lookup(lon, lat, GeoLayer::CouncilDistricts);
        trip.census_geoid_start = geo.lookup(lon, lat, GeoLayer::CensusTracts);
        trip.orig_cell_id = geo.lookup(lon, lat, GeoLayer::HexGrid);
    }
    if let Some((lon, lat)) = route_coordinates(trip, false) {
        trip.end_longitude = Some(lon);
        trip.end_latitude = Some(lat);
        trip.council_district_end = geo.lookup(lon, lat, GeoLayer::CouncilDistricts);
        trip.census_geoid_end = geo.lookup(lon, lat, GeoLayer::CensusTracts);
        trip.dest_cell_id = geo.lookup(lon, lat, GeoLayer::HexGrid);
    }
}

/// VeoRide sends integer `trip_id`/`device_id`/`vehicle_id`. Rather than a
/// plain decimal string, the warehouse expects a UUID shaped like the
/// provider's own id: seed the integer's 16-byte big-endian encoding into a
/// UUID, then splice the provider id's leading characters in front of
/// wherever that encoding first differs from an all-zero UUID.
pub fn int_to_uuid(provider_id: &str, n: i64) -> String {
    let mut bytes = [0u8; 16];
    bytes[8..16].copy_from_slice(&(n as u64).to_be_bytes());
    let derived = Uuid::from_bytes(bytes).hyphenated().to_string();

    let splice_at = derived
        .char_indices()
        .find(|(_, c)| *c != '0' && *c != '-')
        .map_or(derived.len(), |(i, _)| i);

    let prefix_end = splice_at.min(provider_id.len());
    format!("{}{}", &provider_id[..prefix_end], &derived[splice_at..])
}

/// Resolves `trip_id`/`device_id`/`vehicle_id` for rendering, applying the
/// VeoRide integer-id quirk when the provider name matches exactly.
pub fn resolve_ids(trip: &Trip) -> Result<(String, String, String)> {
    if trip.provider_name == "VeoRide INC." {
        let trip_id = trip
            .trip_id
            .as_i64()
            .ok_or_else(|| MdsError::ValidationError("VeoRide trip_id must be an integer".into()))?;
        let device_id = trip
            .device_id
            .as_i64()
            .ok_or_else(|| MdsError::ValidationError("VeoRide device_id must be an integer".into()))?;
        return Ok((
            int_to_uuid(&trip.provider_id, trip_id),
            int_to_uuid(&trip.provider_id, device_id),
            trip.vehicle_id.to_display_string(),
        ));
    }
    Ok((
        trip.trip_id.to_display_string(),
        trip.device_id.to_display_string(),
        trip.vehicle_id.to_display_string(),
    ))
}

/// Renders a GraphQL list literal of strings, e.g. `["electric", "combustion"]`.
fn string_list(values: &[String]) -> GraphQlValue {
    let items: Vec<String> = values.iter().map(|v| format!("\"{}\"", v.replace('"', "\\\""))).collect();
    GraphQlValue::Raw(format!("[{}]", items.join(", ")))
}

fn optional_str(value: &Option<String>) -> GraphQlValue {
    value.clone().map(GraphQlValue::Str).unwrap_or(GraphQlValue::Raw("null".into()))
}

fn optional_float(value: Option<f64>) -> GraphQlValue {
    value.map(GraphQlValue::Float).unwrap_or(GraphQlValue::Raw("null".into()))
}

/// Renders an `insert_api_trips` mutation with an `on_conflict` clause that
/// updates only the enrichment and timestamp columns.
pub fn render_insert_mutation(trip: &Trip, zone: Tz) -> Result<String> {
    let (trip_id, device_id, vehicle_id) = resolve_ids(trip)?;

    let publication_time = trip
        .publication_time
        .map(|ts| format_timestamp(ts, zone))
        .unwrap_or_else(|| format_timestamp(Utc::now().timestamp(), zone));

    let fields: Vec<(&str, GraphQlValue)> = vec![
        ("trip_id", GraphQlValue::Str(trip_id)),
        ("provider_id", GraphQlValue::Str(trip.provider_id.clone())),
        ("provider_name", GraphQlValue::Str(trip.provider_name.clone())),
        ("device_id", GraphQlValue::Str(device_id)),
        ("vehicle_id", GraphQlValue::Str(vehicle_id)),
        ("vehicle_type", GraphQlValue::Str(trip.vehicle_type.clone())),
        ("propulsion_type", string_list(&trip.propulsion_type)),
        ("route", GraphQlValue::Str(trip.route.to_string())),
        ("accuracy", GraphQlValue::Float(trip.accuracy)),
        ("start_time", GraphQlValue::Str(format_timestamp(trip.start_time, zone))),
        ("end_time", GraphQlValue::Str(format_timestamp(trip.end_time, zone))),
        ("publication_time", GraphQlValue::Str(publication_time)),
        ("trip_duration", GraphQlValue::Float(trip.trip_duration)),
        ("trip_distance", GraphQlValue::Float(trip.trip_distance)),
        ("standard_cost", optional_float(trip.standard_cost)),
        ("actual_cost", optional_float(trip.actual_cost)),
        ("parking_verification_url", optional_str(&trip.parking_verification_url)),
        ("currency", optional_str(&trip.currency)),
        ("start_latitude", optional_float(trip.start_latitude)),
        ("start_longitude", optional_float(trip.start_longitude)),
        ("end_latitude", optional_float(trip.end_latitude)),
        ("end_longitude", optional_float(trip.end_longitude)),
        ("council_district_start", optional_str(&trip.council_district_start)),
        ("council_district_end", optional_str(&trip.council_district_end)),
        ("census_geoid_start", optional_str(&trip.census_geoid_start)),
        ("census_geoid_end", optional_str(&trip.census_geoid_end)),
        ("orig_cell_id", optional_str(&trip.orig_cell_id)),
        ("dest_cell_id", optional_str(&trip.dest_cell_id)),
    ];

    let rendered: Vec<String> = fields.into_iter().map(|(k, v)| format!("{k}: {}", v.render())).collect();

    Ok(format!(
        "mutation {{ insert_api_trips(objects: [{{ {} }}], on_conflict: {{ constraint: api_trips_pkey, update_columns: [council_district_start, council_district_end, census_geoid_start, census_geoid_end, orig_cell_id, dest_cell_id, publication_time] }}) {{ affected_rows }} }}",
        rendered.join(", ")
    ))
}

/// Geo-id columns that render as empty/null when a trip's coordinates fell
/// outside every known polygon. Socrata's schema expects an integer column,
/// so these coerce to `0` rather than a null or empty string.
const SOCRATA_NULL_AS_ZERO_FIELDS: &[&str] =
    &["council_district_start", "council_district_end", "census_geoid_start", "census_geoid_end"];

/// Parses the `"YYYY-MM-DD HH:MM:SS <zone abbreviation>"` strings the
/// warehouse stores (see [`format_timestamp`]) back into a naive civil
/// datetime, ignoring the trailing zone abbreviation.
fn parse_civil_timestamp(value: &str) -> Option<NaiveDateTime> {
    let mut parts = value.splitn(3, ' ');
    let date = parts.next()?;
    let time = parts.next()?;
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").ok()
}

/// Normalizes a single warehouse row destined for the public Socrata
/// dataset: flattens `device_id` to a plain string regardless of its
/// warehouse representation, reformats `start_time`/`end_time` to
/// `"YYYY-MM-DDTHH:MM:SS"`, derives `year`/`month`/`hour`/`day_of_week` from
/// `end_time`, adds `*_cst` variants of both timestamps in `zone`, and
/// coerces null-like geo-id columns to `0` so every row satisfies the open
/// dataset's schema.
pub fn normalize_socrata_row(row: &serde_json::Value, zone: Tz) -> serde_json::Value {
    let mut row = row.clone();
    let Some(obj) = row.as_object_mut() else {
        return row;
    };

    if let Some(device_id) = obj.get("device_id").cloned() {
        let flattened = match device_id {
            serde_json::Value::Number(n) => serde_json::Value::String(n.to_string()),
            other => other,
        };
        obj.insert("device_id".to_string(), flattened);
    }

    for field in SOCRATA_NULL_AS_ZERO_FIELDS {
        let is_null_like = obj.get(*field).map_or(true, |v| v.is_null() || v.as_str() == Some(""));
        if is_null_like {
            obj.insert((*field).to_string(), serde_json::json!(0));
        }
    }

    let end_naive = obj.get("end_time").and_then(|v| v.as_str()).and_then(parse_civil_timestamp);

    for field in ["start_time", "end_time"] {
        // The warehouse stores start_time/end_time as civil time in `zone`
        // (see `format_timestamp`), so the naive value parsed back out is
        // already that civil time, not UTC.
        let Some(naive) = obj.get(field).and_then(|v| v.as_str()).and_then(parse_civil_timestamp) else {
            continue;
        };
        let utc = zone.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc)).unwrap_or(naive.and_utc());
        obj.insert(field.to_string(), serde_json::json!(utc.format("%Y-%m-%dT%H:%M:%S").to_string()));
        obj.insert(format!("{field}_cst"), serde_json::json!(naive.format("%Y-%m-%dT%H:%M:%S").to_string()));
    }

    if let Some(end_naive) = end_naive {
        obj.insert("year".to_string(), serde_json::json!(end_naive.year()));
        obj.insert("month".to_string(), serde_json::json!(end_naive.month()));
        obj.insert("hour".to_string(), serde_json::json!(end_naive.hour()));
        obj.insert("day_of_week".to_string(), serde_json::json!(end_naive.weekday().num_days_from_monday()));
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn veoride_uuid_fixture_one() {
        assert_eq!(
            int_to_uuid("0309585e-599f-4e57-ac85-ffffffffffff", 1),
            "0309585e-599f-4e57-ac85-fffffffffff1"
        );
    }

    #[test]
    fn veoride_uuid_fixture_two() {
        assert_eq!(
            int_to_uuid("0309585e-599f-4e57-ac85-ffffffffffff", 104_865),
            "0309585e-599f-4e57-ac85-fffffff199a1"
        );
    }

    #[test]
    fn veoride_uuid_fixture_three() {
        assert_eq!(
            int_to_uuid("0309585e-599f-4e57-ac85-ffffffffffff", 99_999_999),
            "0309585e-599f-4e57-ac85-fffff5f5e0ff"
        );
    }

    #[test]
    fn rejects_route_with_fewer_than_two_features() {
        let trip = sample_trip(serde_json::json!({"features": []}));
        let errors = validate(&trip);
        assert!(!errors.is_ok());
    }

    #[test]
    fn truncates_millisecond_epoch_to_ten_digits() {
        assert_eq!(truncate_to_ten_digits(1_577_836_800_123), 1_577_836_800);
        assert_eq!(truncate_to_ten_digits(1_577_836_800), 1_577_836_800);
    }

    #[test]
    fn normalize_socrata_row_flattens_device_id_and_zeroes_null_geo_ids() {
        let row = serde_json::json!({
            "trip_id": "t1",
            "device_id": 42,
            "start_time": "2020-07-01 07:00:00 CDT",
            "end_time": "2020-07-01 07:30:00 CDT",
            "council_district_start": null,
            "council_district_end": "",
            "census_geoid_start": "48453001100",
            "census_geoid_end": null,
        });

        let normalized = normalize_socrata_row(&row, chrono_tz::US::Central);

        assert_eq!(normalized["device_id"], "42");
        assert_eq!(normalized["council_district_start"], 0);
        assert_eq!(normalized["council_district_end"], 0);
        assert_eq!(normalized["census_geoid_start"], "48453001100");
        assert_eq!(normalized["census_geoid_end"], 0);
    }

    #[test]
    fn normalize_socrata_row_derives_utc_and_cst_timestamp_variants() {
        let row = serde_json::json!({
            "start_time": "2020-07-01 07:00:00 CDT",
            "end_time": "2020-07-01 07:30:00 CDT",
        });

        let normalized = normalize_socrata_row(&row, chrono_tz::US::Central);

        assert_eq!(normalized["end_time_cst"], "2020-07-01T07:30:00");
        assert_eq!(normalized["end_time"], "2020-07-01T12:30:00");
        assert_eq!(normalized["year"], 2020);
        assert_eq!(normalized["month"], 7);
        assert_eq!(normalized["hour"], 7);
        assert_eq!(normalized["day_of_week"], 2);
    }

    fn sample_trip(route: serde_json::Value) -> Trip {
        Trip {
            provider_id: "sample".into(),
            provider_name: "Sample Co".into(),
            device_id: IdValue::Str("d1".into()),
            vehicle_id: IdValue::Str("v1".into()),
            vehicle_type: "scooter".into(),
            trip_id: IdValue::Str("t1".into()),
            propulsion_type: vec!["electric".into()],
            route,
            trip_duration: 120.0,
            trip_distance: 500.0,
            accuracy: 5.0,
            start_time: 1_577_836_800,
            end_time: 1_577_836_920,
            standard_cost: None,
            actual_cost: None,
            publication_time: None,
            parking_verification_url: None,
            currency: None,
            start_latitude: None,
            start_longitude: None,
            end_latitude: None,
            end_longitude: None,
            council_district_start: None,
            council_district_end: None,
            census_geoid_start: None,
            census_geoid_end: None,
            orig_cell_id: None,
            dest_cell_id: None,
        }
    }
}

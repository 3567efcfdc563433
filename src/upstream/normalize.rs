//! Turns raw feed records into classifier candidates
//!
//! Madrid feeds wrap their records in `@graph` and are loose about shapes:
//! coordinates come as numbers or numeric strings under several keys and
//! pollutant names vary in casing. Records without usable coordinates are
//! dropped here so nothing downstream has to care.

use serde_json::{Map, Value};

use crate::geo::{Candidate, GeoPoint, Pollutant, Pollutants};
use crate::models::{RecyclingInfo, RecyclingKind, StationReading};

pub const ORIGIN_MADRID: &str = "Madrid Open Data";
pub const ORIGIN_OSM: &str = "OpenStreetMap";
/// Schedule of an official point whose feed entry has none
pub const NO_SCHEDULE: &str = "Consultar horarios";

/// Records under `@graph`, or nothing when the document has no graph
#[must_use]
pub fn graph(document: &Value) -> &[Value] {
    document
        .get("@graph")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// A number, or a string holding one
#[must_use]
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn text<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Record coordinates, if present and in range
#[must_use]
pub fn coordinates(record: &Value) -> Option<GeoPoint> {
    let pairs = [
        (record.get("latitud"), record.get("longitud")),
        (
            record.pointer("/location/latitude"),
            record.pointer("/location/longitude"),
        ),
        (record.get("lat"), record.get("lon")),
    ];

    pairs.into_iter().find_map(|pair| match pair {
        (Some(lat), Some(lon)) => {
            let point = GeoPoint {
                latitude: number(lat)?,
                longitude: number(lon)?,
            };
            point.is_valid().then_some(point)
        }
        _ => None,
    })
}

fn pollutant_for_key(key: &str) -> Option<Pollutant> {
    match key.to_ascii_lowercase().as_str() {
        "no2" => Some(Pollutant::No2),
        "pm10" => Some(Pollutant::Pm10),
        "pm2_5" | "pm25" | "pm2.5" => Some(Pollutant::Pm2_5),
        "o3" => Some(Pollutant::O3),
        "so2" => Some(Pollutant::So2),
        "co" => Some(Pollutant::Co),
        _ => None,
    }
}

/// Pollutant readings found at the top level of a record
#[must_use]
pub fn pollutants(record: &Map<String, Value>) -> Pollutants {
    let mut readings = Pollutants::default();
    for (key, value) in record {
        if let Some(pollutant) = pollutant_for_key(key) {
            if let Some(reading) = number(value) {
                readings.set(pollutant, Some(reading));
            }
        }
    }
    readings
}

fn street_address(record: &Value) -> Option<String> {
    record
        .pointer("/address/street-address")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// One station from the real-time air quality feed
#[must_use]
pub fn air_station(record: &Value) -> Option<Candidate<StationReading>> {
    let point = coordinates(record)?;
    let object = record.as_object()?;

    let mut reading = StationReading::new(pollutants(object));
    if let Some(locality) = record.pointer("/address/locality").and_then(Value::as_str) {
        reading = reading.with_locality(locality);
    }

    let mut candidate = Candidate::new(point, reading)
        .with_name(text(record, "title").unwrap_or("Estación de medición"));
    candidate.address = street_address(record);
    Some(candidate)
}

/// All usable stations of an air quality document
#[must_use]
pub fn air_stations(document: &Value) -> Vec<Candidate<StationReading>> {
    graph(document).iter().filter_map(air_station).collect()
}

/// One official punto limpio
#[must_use]
pub fn clean_point(record: &Value) -> Option<Candidate<RecyclingInfo>> {
    let point = coordinates(record)?;

    let mut info = RecyclingInfo::new(RecyclingKind::PuntoLimpio, ORIGIN_MADRID);
    if let Some(description) = text(record, "description") {
        info.description = description.to_string();
    }
    info.schedule = record
        .pointer("/organization/schedule")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NO_SCHEDULE)
        .to_string();
    info.phone = record
        .pointer("/organization/telephone")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(ToString::to_string);

    let mut candidate = Candidate::new(point, info)
        .with_name(text(record, "title").unwrap_or("Punto Limpio"));
    candidate.address = street_address(record);
    Some(candidate)
}

#[must_use]
pub fn clean_points(document: &Value) -> Vec<Candidate<RecyclingInfo>> {
    graph(document).iter().filter_map(clean_point).collect()
}

fn tag<'a>(tags: &'a Value, key: &str) -> Option<&'a str> {
    text(tags, key)
}

/// Facility kind from OSM tags, first matching rule wins
#[must_use]
pub fn recycling_kind(tags: &Value) -> RecyclingKind {
    let flag = |key: &str| tag(tags, key) == Some("yes");
    let colour = tag(tags, "colour");
    let is_centre = tag(tags, "recycling_type") == Some("centre")
        || tag(tags, "name").is_some_and(|n| n.to_lowercase().contains("punto limpio"));

    if is_centre {
        RecyclingKind::PuntoLimpio
    } else if flag("recycling:glass") || colour == Some("green") {
        RecyclingKind::ContenedorVidrio
    } else if flag("recycling:paper") || colour == Some("blue") {
        RecyclingKind::ContenedorPapel
    } else if flag("recycling:plastic") || colour == Some("yellow") {
        RecyclingKind::ContenedorPlastico
    } else if flag("recycling:organic") || colour == Some("brown") {
        RecyclingKind::ContenedorOrganico
    } else {
        RecyclingKind::Contenedor
    }
}

fn osm_address(tags: &Value) -> Option<String> {
    let street = tag(tags, "addr:street");
    let number = tag(tags, "addr:housenumber");
    let city = tag(tags, "addr:city");

    match (street, city) {
        (Some(street), city) => {
            let mut address = match number {
                Some(number) => format!("{number} {street}"),
                None => street.to_string(),
            };
            if let Some(city) = city {
                address = format!("{address}, {city}");
            }
            Some(address)
        }
        (None, Some(city)) => Some(city.to_string()),
        (None, None) => None,
    }
}

/// One node from an Overpass response
#[must_use]
pub fn osm_point(element: &Value) -> Option<Candidate<RecyclingInfo>> {
    if element.get("type").and_then(Value::as_str) != Some("node") {
        return None;
    }
    let point = coordinates(element)?;
    let empty = Value::Object(Map::new());
    let tags = element.get("tags").unwrap_or(&empty);

    let kind = recycling_kind(tags);
    let mut info = RecyclingInfo::new(kind, ORIGIN_OSM);
    if let Some(schedule) = tag(tags, "opening_hours").or_else(|| tag(tags, "collection_times")) {
        info.schedule = schedule.to_string();
    }
    info.phone = tag(tags, "phone")
        .or_else(|| tag(tags, "contact:phone"))
        .map(ToString::to_string);

    let name = match (tag(tags, "name"), tag(tags, "operator"), tag(tags, "addr:street")) {
        (Some(name), _, _) => name.to_string(),
        (None, _, Some(street)) => format!("{} - {street}", kind.display_name()),
        (None, Some(operator), None) => operator.to_string(),
        (None, None, None) => kind.display_name().to_string(),
    };

    let mut candidate = Candidate::new(point, info).with_name(name);
    candidate.address = osm_address(tags);
    Some(candidate)
}

#[must_use]
pub fn osm_points(document: &Value) -> Vec<Candidate<RecyclingInfo>> {
    document
        .get("elements")
        .and_then(Value::as_array)
        .map(|elements| elements.iter().filter_map(osm_point).collect())
        .unwrap_or_default()
}

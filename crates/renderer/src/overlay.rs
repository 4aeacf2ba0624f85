//! Vector overlays: boundary and coastline lines from GeoJSON, and labelled
//! places from a CSV table.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// A polyline in lon/lat degrees.
pub type Polyline = Vec<(f64, f64)>;

/// All line work of one GeoJSON asset, flattened to polylines.
/// Polygon rings are kept as closed polylines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSet {
    pub lines: Vec<Polyline>,
}

impl LineSet {
    pub fn load(path: &Path) -> RenderResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| RenderError::asset(path, e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| RenderError::asset(path, e))?;

        let mut set = LineSet::default();
        set.collect(&value)
            .map_err(|message| RenderError::asset(path, message))?;

        debug!(path = %path.display(), lines = set.lines.len(), "Loaded line overlay");
        Ok(set)
    }

    pub fn from_geojson(value: &Value) -> Result<Self, String> {
        let mut set = LineSet::default();
        set.collect(value)?;
        Ok(set)
    }

    pub fn point_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    fn collect(&mut self, value: &Value) -> Result<(), String> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or("GeoJSON object without a type")?;

        match kind {
            "FeatureCollection" => {
                let features = value
                    .get("features")
                    .and_then(Value::as_array)
                    .ok_or("FeatureCollection without features")?;
                for feature in features {
                    self.collect(feature)?;
                }
            }
            "Feature" => match value.get("geometry") {
                Some(Value::Null) | None => {}
                Some(geometry) => self.collect(geometry)?,
            },
            "GeometryCollection" => {
                let geometries = value
                    .get("geometries")
                    .and_then(Value::as_array)
                    .ok_or("GeometryCollection without geometries")?;
                for geometry in geometries {
                    self.collect(geometry)?;
                }
            }
            "LineString" => self.lines.push(positions(coordinates(value)?)?),
            "MultiLineString" | "Polygon" => {
                for line in as_array(coordinates(value)?)? {
                    self.lines.push(positions(line)?);
                }
            }
            "MultiPolygon" => {
                for polygon in as_array(coordinates(value)?)? {
                    for ring in as_array(polygon)? {
                        self.lines.push(positions(ring)?);
                    }
                }
            }
            // Points carry no line work.
            "Point" | "MultiPoint" => {}
            other => return Err(format!("unsupported geometry type {}", other)),
        }
        Ok(())
    }
}

fn coordinates(geometry: &Value) -> Result<&Value, String> {
    geometry
        .get("coordinates")
        .ok_or_else(|| "geometry without coordinates".to_string())
}

fn as_array(value: &Value) -> Result<&Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected an array, found {}", value))
}

fn positions(value: &Value) -> Result<Polyline, String> {
    as_array(value)?
        .iter()
        .map(|position| {
            let pair = as_array(position)?;
            match (pair.first().and_then(Value::as_f64), pair.get(1).and_then(Value::as_f64)) {
                (Some(lon), Some(lat)) => Ok((lon, lat)),
                _ => Err(format!("invalid position {}", position)),
            }
        })
        .collect()
}

/// A labelled point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub lon: f64,
    pub lat: f64,
    pub id: String,
}

/// Read a `lon,lat,id` CSV table.
pub fn load_places(path: &Path) -> RenderResult<Vec<Place>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| RenderError::asset(path, e))?;
    let places = read_places(reader).map_err(|e| RenderError::asset(path, e))?;

    debug!(path = %path.display(), count = places.len(), "Loaded places");
    Ok(places)
}

pub fn parse_places(text: &str) -> Result<Vec<Place>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    read_places(reader)
}

fn read_places<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Place>, csv::Error> {
    reader.deserialize().collect()
}

//! Emission records
//!
//! Every feature of the dominant kind becomes one ground-level emission
//! source whose strength is 1 for a point, its length for a line and its
//! area for a polygon. The strength is attributed to a single pollutant
//! channel; the other channels are zero.

use std::fmt;
use std::str::FromStr;

use geo::Geometry;
use lurcov_core::{Error, Feature, GeometryKind, Result};
use serde::{Deserialize, Serialize};

use crate::vector::{area, classify, length};

/// Pollutant channels of a source-receptor dispersion model.
///
/// Each channel is driven by one emitted species: primary PM2.5 by PM2.5,
/// particulate ammonium by NH3, nitrate by NOx, sulfate by SOx and
/// secondary organic aerosol by VOC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pollutant {
    #[default]
    PrimaryPm25,
    PNh4,
    PNo3,
    PSo4,
    Soa,
}

impl Pollutant {
    pub const ALL: [Pollutant; 5] = [
        Pollutant::PrimaryPm25,
        Pollutant::PNh4,
        Pollutant::PNo3,
        Pollutant::PSo4,
        Pollutant::Soa,
    ];

    /// Channel name as used by the dispersion model
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::PrimaryPm25 => "PrimaryPM25",
            Pollutant::PNh4 => "pNH4",
            Pollutant::PNo3 => "pNO3",
            Pollutant::PSo4 => "pSO4",
            Pollutant::Soa => "SOA",
        }
    }

    /// Emitted species that drives this channel
    pub fn precursor(&self) -> &'static str {
        match self {
            Pollutant::PrimaryPm25 => "PM2_5",
            Pollutant::PNh4 => "NH3",
            Pollutant::PNo3 => "NOx",
            Pollutant::PSo4 => "SOx",
            Pollutant::Soa => "VOC",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pollutant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pollutant::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::UnsupportedPollutant(s.to_string()))
    }
}

/// Parameters for emission mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionParams {
    pub pollutant: Pollutant,
}

/// A feature geometry emitting into one pollutant channel.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRecord {
    pub geometry: Geometry<f64>,
    pub pollutant: Pollutant,
    /// Emission strength: 1, length or area depending on kind
    pub magnitude: f64,
}

impl EmissionRecord {
    pub fn new(geometry: Geometry<f64>, pollutant: Pollutant, magnitude: f64) -> Self {
        Self {
            geometry,
            pollutant,
            magnitude,
        }
    }

    /// Emission into `channel`; zero for every channel but the record's own
    pub fn emission(&self, channel: Pollutant) -> f64 {
        if channel == self.pollutant {
            self.magnitude
        } else {
            0.0
        }
    }
}

/// Map features to emission records for `pollutant`.
///
/// The feature set is classified first and only features of the dominant
/// kind are emitted, in input order. A collection-dominated set yields no
/// records.
pub fn to_emissions(features: &[Feature], pollutant: Pollutant) -> Result<Vec<EmissionRecord>> {
    let kind = classify(features)?;
    let magnitude: fn(&Geometry<f64>) -> f64 = match kind {
        GeometryKind::Point => |_| 1.0,
        GeometryKind::Line => length,
        GeometryKind::Polygon => area,
        GeometryKind::Collection => return Ok(Vec::new()),
    };

    Ok(features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .filter(|g| GeometryKind::of(g) == kind)
        .map(|g| EmissionRecord::new(g.clone(), pollutant, magnitude(g)))
        .collect())
}

/// Same as [`to_emissions`] with the pollutant given by channel name.
///
/// The name is checked before any geometry is looked at.
pub fn to_emissions_named(features: &[Feature], pollutant: &str) -> Result<Vec<EmissionRecord>> {
    let pollutant: Pollutant = pollutant.parse()?;
    to_emissions(features, pollutant)
}

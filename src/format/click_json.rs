//! The click file: per-frame point lists as JSON.
//!
//! ```json
//! {
//!   "coords_raw":  [[[x, y], ...], ...],
//!   "coords_real": [[[x, y], [null, null], ...], ...]
//! }
//! ```
//!
//! Both fields hold one inner list per frame, in click order. Unset real
//! coordinates (points recorded before calibration) are written as a pair of
//! nulls; non-finite real values are written the same way.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::model::{AnnotationStore, PixelPoint, RealPoint};

/// Name of the pixel-coordinate field.
pub const COORDS_RAW: &str = "coords_raw";

/// Name of the real-coordinate field.
pub const COORDS_REAL: &str = "coords_real";

/// A raw `[x, y]` pixel pair.
pub type RawPair = [f64; 2];

/// A real `[x, y]` pair; `[null, null]` when unset.
pub type RealPair = [Option<f64>; 2];

/// Which coordinate field to read points from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordSpace {
    /// `coords_raw`: source pixel coordinates
    Raw,
    /// `coords_real`: calibrated coordinates
    #[default]
    Real,
}

impl CoordSpace {
    /// Field name in the click file.
    pub fn field(&self) -> &'static str {
        match self {
            CoordSpace::Raw => COORDS_RAW,
            CoordSpace::Real => COORDS_REAL,
        }
    }
}

/// The click file's two fields, exactly as stored.
///
/// This is what downstream consumers (plotting, analysis) work with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickData {
    pub coords_raw: Vec<Vec<RawPair>>,
    pub coords_real: Vec<Vec<RealPair>>,
}

/// On-disk shape used for reading, so absent fields can be reported by name.
#[derive(Deserialize)]
struct ClickFile {
    coords_raw: Option<Vec<Vec<RawPair>>>,
    coords_real: Option<Vec<Vec<RealPair>>>,
}

impl ClickData {
    /// Snapshot an annotation store.
    pub fn from_store(store: &AnnotationStore) -> Self {
        let coords_raw = store
            .all_pixel_points()
            .iter()
            .map(|frame| frame.iter().map(|p| RawPair::from(*p)).collect())
            .collect();

        let coords_real = store
            .all_real_points()
            .iter()
            .map(|frame| frame.iter().map(|p| real_pair(*p)).collect())
            .collect();

        Self {
            coords_raw,
            coords_real,
        }
    }

    /// Parse a click file, checking that both fields exist and agree on the
    /// number of frames.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let file: ClickFile = serde_json::from_str(json)?;

        let coords_raw = file
            .coords_raw
            .ok_or_else(|| FormatError::missing_field(COORDS_RAW))?;
        let coords_real = file
            .coords_real
            .ok_or_else(|| FormatError::missing_field(COORDS_REAL))?;

        if coords_raw.len() != coords_real.len() {
            return Err(FormatError::FrameCountMismatch {
                raw: coords_raw.len(),
                real: coords_real.len(),
            });
        }

        Ok(Self {
            coords_raw,
            coords_real,
        })
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.coords_raw.len()
    }

    /// Points of one frame in the chosen space, skipping unset real points.
    ///
    /// Returns `None` if the frame index is out of range.
    pub fn frame_points(&self, space: CoordSpace, frame: usize) -> Option<Vec<[f64; 2]>> {
        match space {
            CoordSpace::Raw => self.coords_raw.get(frame).cloned(),
            CoordSpace::Real => self.coords_real.get(frame).map(|points| {
                points
                    .iter()
                    .filter_map(|[x, y]| Some([(*x)?, (*y)?]))
                    .collect()
            }),
        }
    }

    /// Convert into an annotation store.
    pub fn into_store(self) -> Result<AnnotationStore, FormatError> {
        let pixel_points: Vec<Vec<PixelPoint>> = self
            .coords_raw
            .into_iter()
            .map(|frame| frame.into_iter().map(PixelPoint::from).collect())
            .collect();

        let real_points = self
            .coords_real
            .into_iter()
            .enumerate()
            .map(|(frame, points)| {
                points
                    .into_iter()
                    .enumerate()
                    .map(|(index, pair)| parse_real_pair(pair, frame, index))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AnnotationStore::from_parts(pixel_points, real_points)?)
    }
}

fn real_pair(point: Option<RealPoint>) -> RealPair {
    match point {
        Some(p) if p.x.is_finite() && p.y.is_finite() => [Some(p.x), Some(p.y)],
        _ => [None, None],
    }
}

fn parse_real_pair(
    pair: RealPair,
    frame: usize,
    index: usize,
) -> Result<Option<RealPoint>, FormatError> {
    match pair {
        [Some(x), Some(y)] => Ok(Some(RealPoint::new(x, y))),
        [None, None] => Ok(None),
        _ => Err(FormatError::invalid_coordinates(format!(
            "frame {frame}, point {index}: real coordinate is only half set"
        ))),
    }
}

/// Serialize an annotation store to click-file JSON.
pub fn annotations_to_json(store: &AnnotationStore) -> Result<String, FormatError> {
    ClickData::from_store(store).to_json()
}

/// Parse click-file JSON into an annotation store.
pub fn annotations_from_json(json: &str) -> Result<AnnotationStore, FormatError> {
    ClickData::from_json(json)?.into_store()
}

/// Write an annotation store to `path`.
pub fn save_annotations(path: &Path, store: &AnnotationStore) -> Result<(), FormatError> {
    log::info!("Saving click file to {:?}", path);
    let json = annotations_to_json(store)?;
    std::fs::write(path, json)?;
    log::info!(
        "Saved {} points over {} frames",
        store.total_points(),
        store.frame_count()
    );
    Ok(())
}

/// Read an annotation store from `path`.
pub fn load_annotations(path: &Path) -> Result<AnnotationStore, FormatError> {
    load_click_data(path)?.into_store()
}

/// Read a click file for downstream use, keeping its two-field layout.
pub fn load_click_data(path: &Path) -> Result<ClickData, FormatError> {
    log::info!("Loading click file from {:?}", path);
    let json = std::fs::read_to_string(path)?;
    let data = ClickData::from_json(&json)?;
    log::info!("Loaded click file with {} frames", data.frame_count());
    Ok(data)
}

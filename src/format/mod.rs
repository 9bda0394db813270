//! Click file persistence.
//!
//! Annotation stores are saved as a JSON document with two top-level fields,
//! `coords_raw` and `coords_real`, each holding one list of `[x, y]` pairs
//! per frame. See [`click_json`] for the exact layout.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vclick::format::{save_annotations, load_click_data, CoordSpace};
//!
//! save_annotations(path, session.store())?;
//!
//! // Downstream: read one frame's calibrated points
//! let data = load_click_data(path)?;
//! let points = data.frame_points(CoordSpace::Real, 0);
//! ```

pub mod click_json;
mod error;

#[cfg(test)]
mod tests;

pub use click_json::{
    COORDS_RAW, COORDS_REAL, ClickData, CoordSpace, RawPair, RealPair, annotations_from_json,
    annotations_to_json, load_annotations, load_click_data, save_annotations,
};
pub use error::FormatError;

pub mod config;

pub use config::{default_active_bands, default_bands};

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A horizontal slice of the viewport, expressed as fractions of its height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub friendly_key: String,
    pub top_vh: f64,
    pub bottom_vh: f64,
}

impl Band {
    pub fn new(friendly_key: impl Into<String>, top_vh: f64, bottom_vh: f64) -> Self {
        Self {
            friendly_key: friendly_key.into(),
            top_vh,
            bottom_vh,
        }
    }

    /// Pixel offsets of the band's top and bottom lines for the given viewport.
    pub fn pixel_span(&self, viewport_height_px: f64) -> (f64, f64) {
        (
            self.top_vh * viewport_height_px,
            self.bottom_vh * viewport_height_px,
        )
    }

    /// Margins that shrink the observation root down to this band, so an
    /// intersection fires when a target crosses the band lines rather than the
    /// viewport edges.
    pub fn root_margin(&self, viewport_height_px: f64) -> RootMargin {
        let (top_px, bottom_px) = self.pixel_span(viewport_height_px);
        RootMargin {
            top_px: -top_px,
            right_px: 0.0,
            bottom_px: -(viewport_height_px - bottom_px),
            left_px: 0.0,
        }
    }
}

/// Observation root margins in pixels. Negative values shrink the root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootMargin {
    pub top_px: f64,
    pub right_px: f64,
    pub bottom_px: f64,
    pub left_px: f64,
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top_px, self.right_px, self.bottom_px, self.left_px
        )
    }
}

/// Debug overlay caption for the band at `index`. The first band carries no
/// marker; the upper bands point at their bottom line, the rest at their top.
pub fn marker_label(bands: &[Band], index: usize, viewport_height_px: f64) -> Option<String> {
    if index == 0 {
        return None;
    }
    let band = bands.get(index)?;
    let (top_px, bottom_px) = band.pixel_span(viewport_height_px);
    let position = if index < 2 { bottom_px } else { top_px };
    Some(format!(
        "{}: {{ position: {}px }}",
        band.friendly_key,
        position.floor()
    ))
}

#[derive(Debug, Error, PartialEq)]
pub enum BandConfigError {
    #[error("band table is empty")]
    Empty,

    #[error("duplicate band key: {0}")]
    DuplicateKey(String),

    #[error("band {key} has invalid bounds [{top_vh}, {bottom_vh}]")]
    InvalidBounds {
        key: String,
        top_vh: f64,
        bottom_vh: f64,
    },

    #[error("band {key} overlaps or precedes the band above it")]
    OutOfOrder { key: String },

    #[error("active band {0} is not in the band table")]
    UnknownActiveBand(String),
}

/// Checks that the table is non-empty, keyed uniquely, within the viewport and
/// ordered top to bottom without overlap.
pub fn validate_bands(bands: &[Band]) -> Result<(), BandConfigError> {
    if bands.is_empty() {
        return Err(BandConfigError::Empty);
    }

    let mut keys = HashSet::new();
    let mut previous_bottom = 0.0;
    for band in bands {
        if !keys.insert(band.friendly_key.as_str()) {
            return Err(BandConfigError::DuplicateKey(band.friendly_key.clone()));
        }
        let in_range = (0.0..=1.0).contains(&band.top_vh) && (0.0..=1.0).contains(&band.bottom_vh);
        if !in_range || band.top_vh >= band.bottom_vh {
            return Err(BandConfigError::InvalidBounds {
                key: band.friendly_key.clone(),
                top_vh: band.top_vh,
                bottom_vh: band.bottom_vh,
            });
        }
        if band.top_vh < previous_bottom {
            return Err(BandConfigError::OutOfOrder {
                key: band.friendly_key.clone(),
            });
        }
        previous_bottom = band.bottom_vh;
    }
    Ok(())
}

/// Checks that every active key names a band in the table.
pub fn validate_active_bands(bands: &[Band], active: &[String]) -> Result<(), BandConfigError> {
    for key in active {
        if !bands.iter().any(|band| &band.friendly_key == key) {
            return Err(BandConfigError::UnknownActiveBand(key.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_margin_collapses_viewport_to_band() {
        let band = Band::new("B2", 0.25, 0.75);
        let margin = band.root_margin(800.0);
        assert_eq!(margin.top_px, -200.0);
        assert_eq!(margin.bottom_px, -200.0);
        assert_eq!(margin.to_string(), "-200px 0px -200px 0px");
    }

    #[test]
    fn root_margin_for_top_band_keeps_viewport_top() {
        let band = Band::new("B0", 0.0, 0.1);
        let margin = band.root_margin(1000.0);
        assert_eq!(margin.top_px, 0.0);
        assert_eq!(margin.bottom_px, -900.0);
    }

    #[test]
    fn default_table_is_valid() {
        let bands = default_bands();
        assert!(validate_bands(&bands).is_ok());
        assert!(validate_active_bands(&bands, &default_active_bands()).is_ok());
    }

    #[test]
    fn rejects_overlapping_bands() {
        let bands = vec![Band::new("B0", 0.0, 0.5), Band::new("B1", 0.4, 1.0)];
        assert_eq!(
            validate_bands(&bands),
            Err(BandConfigError::OutOfOrder { key: "B1".into() })
        );
    }

    #[test]
    fn rejects_duplicate_keys_and_inverted_bounds() {
        let dup = vec![Band::new("B0", 0.0, 0.5), Band::new("B0", 0.5, 1.0)];
        assert_eq!(
            validate_bands(&dup),
            Err(BandConfigError::DuplicateKey("B0".into()))
        );

        let inverted = vec![Band::new("B0", 0.6, 0.2)];
        assert!(matches!(
            validate_bands(&inverted),
            Err(BandConfigError::InvalidBounds { .. })
        ));
        assert_eq!(validate_bands(&[]), Err(BandConfigError::Empty));
    }

    #[test]
    fn unknown_active_band_is_reported() {
        let bands = default_bands();
        assert_eq!(
            validate_active_bands(&bands, &["B9".to_string()]),
            Err(BandConfigError::UnknownActiveBand("B9".into()))
        );
    }

    #[test]
    fn marker_labels_point_at_band_lines() {
        let bands = default_bands();
        assert_eq!(marker_label(&bands, 0, 1000.0), None);
        assert_eq!(
            marker_label(&bands, 1, 1000.0).as_deref(),
            Some("B1: { position: 250px }")
        );
        assert_eq!(
            marker_label(&bands, 2, 1000.0).as_deref(),
            Some("B2: { position: 250px }")
        );
        assert_eq!(marker_label(&bands, 9, 1000.0), None);
    }
}

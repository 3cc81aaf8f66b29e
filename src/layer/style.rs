//! Feature styling.
//!
//! A [`Style`] carries optional canvas-state fields plus an optional
//! `selected` substyle; the effective style of a feature is the substyle
//! while the feature is selected, otherwise the style itself. Styles are
//! resolved at draw time, never stored per tile, so selection and style
//! changes apply consistently to every tile a feature appears in.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decode::{DecodedFeature, GeometryKind};

/// Default point radius in pixels when a point style sets none.
pub const DEFAULT_POINT_RADIUS: f64 = 3.0;

/// Drawing state for one feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Fill color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_style: Option<String>,

    /// Stroke color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_style: Option<String>,

    /// Stroke width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,

    /// Point radius in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,

    /// Style used instead of this one while the feature is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Box<Style>>,
}

impl Style {
    /// The style to draw with given the feature's selection state.
    pub fn effective(&self, selected: bool) -> &Style {
        match (&self.selected, selected) {
            (Some(substyle), true) => substyle,
            _ => self,
        }
    }

    /// Point radius, defaulted.
    pub fn radius_or_default(&self) -> f64 {
        self.radius.unwrap_or(DEFAULT_POINT_RADIUS)
    }
}

/// Resolver closure type: feature in, style out.
pub type StyleFn = Arc<dyn Fn(&dyn DecodedFeature) -> Style + Send + Sync>;

/// How the configured style maps onto features.
#[derive(Clone)]
pub enum StyleResolver {
    /// One style for every feature
    Fixed(Style),

    /// Per-feature resolver function
    Resolve(StyleFn),
}

impl StyleResolver {
    /// Resolve the style for a feature.
    pub fn resolve(&self, feature: &dyn DecodedFeature) -> Style {
        match self {
            Self::Fixed(style) => style.clone(),
            Self::Resolve(f) => f(feature),
        }
    }
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::Resolve(Arc::new(|feature| {
            default_style(feature.geometry_kind())
        }))
    }
}

impl fmt::Debug for StyleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(style) => f.debug_tuple("Fixed").field(style).finish(),
            Self::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

impl From<Style> for StyleResolver {
    fn from(style: Style) -> Self {
        Self::Fixed(style)
    }
}

/// The built-in style table, per geometry type.
pub fn default_style(kind: GeometryKind) -> Style {
    match kind {
        GeometryKind::Point => Style {
            fill_style: Some("rgba(49,79,79,1)".to_string()),
            radius: Some(5.0),
            selected: Some(Box::new(Style {
                fill_style: Some("rgba(255,255,0,0.5)".to_string()),
                radius: Some(6.0),
                ..Style::default()
            })),
            ..Style::default()
        },
        GeometryKind::LineString => Style {
            stroke_style: Some("rgba(136, 86, 167, 1)".to_string()),
            line_width: Some(3.0),
            selected: Some(Box::new(Style {
                stroke_style: Some("rgba(255,25,0,0.5)".to_string()),
                line_width: Some(4.0),
                ..Style::default()
            })),
            ..Style::default()
        },
        GeometryKind::Polygon => Style {
            fill_style: Some("rgba(188, 189, 220, 0.5)".to_string()),
            stroke_style: Some("rgba(136, 86, 167, 1)".to_string()),
            line_width: Some(1.0),
            selected: Some(Box::new(Style {
                fill_style: Some("rgba(255,140,0,0.3)".to_string()),
                stroke_style: Some("rgba(255,140,0,1)".to_string()),
                line_width: Some(2.0),
                ..Style::default()
            })),
            ..Style::default()
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

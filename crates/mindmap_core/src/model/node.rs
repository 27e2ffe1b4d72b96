//! Node domain model.
//!
//! # Responsibility
//! - Define the positioned, labeled vertex rendered on the diagram canvas.
//! - Provide the partial-update shape used by move/edit/resize/recolor.
//!
//! # Invariants
//! - `id` is stable and never reused for another node.
//! - `size` is a closed enumeration.
//! - `color` is either a named palette entry or a `#rrggbb` tag.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a diagram node.
pub type NodeId = Uuid;

/// Named palette entries accepted as node colors.
pub const PALETTE: &[&str] = &["blue", "green", "yellow", "red", "purple", "gray"];

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Visual size class of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl NodeSize {
    /// Hit radius in canvas units.
    pub fn radius(self) -> f64 {
        match self {
            Self::Small => 24.0,
            Self::Medium => 36.0,
            Self::Large => 48.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Rejected palette tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColorError(pub String);

impl Display for InvalidColorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid node color `{}`; expected a palette name or #rrggbb",
            self.0
        )
    }
}

impl Error for InvalidColorError {}

/// Palette tag for node fill.
///
/// Serialized as a plain string. Hex tags are normalized to lowercase so two
/// spellings of one color compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeColor(String);

impl NodeColor {
    /// Parses a palette name (case-insensitive) or `#rrggbb` tag.
    pub fn parse(value: &str) -> Result<Self, InvalidColorError> {
        let trimmed = value.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if PALETTE.contains(&lowered.as_str()) || HEX_COLOR_RE.is_match(trimmed) {
            return Ok(Self(lowered));
        }
        Err(InvalidColorError(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for NodeColor {
    fn default() -> Self {
        Self(PALETTE[0].to_string())
    }
}

impl TryFrom<String> for NodeColor {
    type Error = InvalidColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<NodeColor> for String {
    fn from(value: NodeColor) -> Self {
        value.0
    }
}

impl Display for NodeColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Canonical diagram vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// User-facing label. May be empty while being edited.
    pub text: String,
    /// Canvas-space x coordinate (unscaled by zoom).
    pub x: f64,
    /// Canvas-space y coordinate (unscaled by zoom).
    pub y: f64,
    pub color: NodeColor,
    pub size: NodeSize,
}

impl Node {
    /// Creates a node with a fresh id at the given canvas position.
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            x,
            y,
            color: NodeColor::default(),
            size: NodeSize::default(),
        }
    }

    /// Returns whether the canvas point falls within this node's disc.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (dx, dy) = (self.x - x, self.y - y);
        (dx * dx + dy * dy).sqrt() <= self.size.radius()
    }

    /// Merges the set fields of `patch` into this node.
    pub fn apply(&mut self, patch: &NodePatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
    }
}

/// Partial node update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub text: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<NodeColor>,
    pub size: Option<NodeSize>,
}

impl NodePatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn color(color: NodeColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn size(size: NodeSize) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.x.is_none()
            && self.y.is_none()
            && self.color.is_none()
            && self.size.is_none()
    }

    /// Returns whether this patch only moves the node.
    pub fn is_move_only(&self) -> bool {
        (self.x.is_some() || self.y.is_some())
            && self.text.is_none()
            && self.color.is_none()
            && self.size.is_none()
    }
}

//! Canonical cell styles.

use super::Decoration;
use serde::{Deserialize, Serialize};

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// How overflowing text is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapStrategy {
    Clip,
    Wrap,
}

/// Reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextDirection {
    Unspecified,
    LeftToRight,
    RightToLeft,
}

/// Text rotation; `vertical` stacks characters and forces `angle` to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRotation {
    pub angle: i32,
    pub vertical: bool,
}

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Hair,
    Dotted,
    Dashed,
    DashDot,
    DashDotDot,
    MediumDashed,
    MediumDashDot,
    MediumDashDotDot,
    SlantDashDot,
    Double,
}

impl BorderStyle {
    /// Map an OOXML `ST_BorderStyle` keyword; `none` and unknown keywords yield `None`.
    pub fn from_ooxml(style: &str) -> Option<Self> {
        Some(match style {
            "thin" => BorderStyle::Thin,
            "medium" => BorderStyle::Medium,
            "thick" => BorderStyle::Thick,
            "hair" => BorderStyle::Hair,
            "dotted" => BorderStyle::Dotted,
            "dashed" => BorderStyle::Dashed,
            "dashDot" => BorderStyle::DashDot,
            "dashDotDot" => BorderStyle::DashDotDot,
            "mediumDashed" => BorderStyle::MediumDashed,
            "mediumDashDot" => BorderStyle::MediumDashDot,
            "mediumDashDotDot" => BorderStyle::MediumDashDotDot,
            "slantDashDot" => BorderStyle::SlantDashDot,
            "double" => BorderStyle::Double,
            _ => return None,
        })
    }
}

/// One side of a cell border.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderSide {
    pub style: BorderStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Cell border; absent sides are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderSide>,
    /// Top-left to bottom-right diagonal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagonal_down: Option<BorderSide>,
    /// Bottom-left to top-right diagonal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagonal_up: Option<BorderSide>,
}

impl Border {
    /// Whether no side is drawn.
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
            && self.bottom.is_none()
            && self.left.is_none()
            && self.right.is_none()
            && self.diagonal_down.is_none()
            && self.diagonal_up.is_none()
    }
}

/// A canonical style record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<Decoration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<Decoration>,

    /// Font color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Fill color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_align: Option<HorizontalAlign>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<WrapStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_direction: Option<TextDirection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<TextRotation>,

    /// Number format pattern, e.g. `0.00%`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

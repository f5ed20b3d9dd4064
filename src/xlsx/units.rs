//! Color and unit conversions applied while importing.

/// Pixels per character of column width.
const COLUMN_CHAR_PX: f64 = 6.96753760886777;

/// Pixels per point of row height.
const ROW_POINT_PX: f64 = 1.52380952380952;

/// Rotate an `AARRGGBB` hex color into `#RRGGBBAA`.
///
/// The alpha byte moves to the end rather than being dropped. Consumers of
/// the imported document depend on this exact form, so it must not be
/// "corrected" to plain `#RRGGBB`.
pub fn argb_to_rgb(argb: &str) -> String {
    match (argb.get(2..), argb.get(..2)) {
        (Some(rgb), Some(alpha)) => format!("#{}{}", rgb, alpha),
        _ => format!("#{}", argb),
    }
}

/// Column width in characters to pixels, rounded to 2 decimals.
pub fn column_width_to_px(chars: f64) -> f64 {
    round2(chars * COLUMN_CHAR_PX)
}

/// Row height in points to pixels, rounded to 2 decimals.
pub fn row_height_to_px(points: f64) -> f64 {
    round2(points * ROW_POINT_PX)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Text output for published placements and alerts

use std::fmt::Write as _;

use poi_lens_core::{Alert, MarkerPlacement};

/// Width of the compass strip in characters
const STRIP_WIDTH: usize = 48;

/// One-line view of where markers sit across the screen.
///
/// Markers are numbered nearest first; nearer markers overwrite farther ones
/// that land in the same column.
pub fn compass_strip(placements: &[MarkerPlacement], screen_width_px: f64) -> String {
    let mut strip = vec!['-'; STRIP_WIDTH];
    let last_column = (STRIP_WIDTH - 1) as f64;

    for (index, marker) in placements.iter().enumerate().rev() {
        let fraction = if screen_width_px > 0.0 {
            (marker.horizontal_offset_px / screen_width_px).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let column = (fraction * last_column).round() as usize;
        strip[column] = marker_label(index);
    }

    format!("[{}]", strip.into_iter().collect::<String>())
}

fn marker_label(index: usize) -> char {
    u32::try_from(index + 1)
        .ok()
        .and_then(|n| char::from_digit(n, 10))
        .unwrap_or('+')
}

/// Numbered table of placements, nearest first
pub fn render_placements(
    frame: usize,
    placements: &[MarkerPlacement],
    screen_width_px: f64,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "frame {}: {} visible", frame, placements.len());
    let _ = writeln!(out, "  {}", compass_strip(placements, screen_width_px));

    for (index, marker) in placements.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {} {:<28} {:<12} {:>6.2} km {:>4.0}° x{:>5.0} y{:>5.0} scale {:.2} opacity {:.2}",
            marker_label(index),
            marker.place.name,
            marker.place.primary_category(),
            marker.place.distance_km,
            marker.bearing_deg,
            marker.horizontal_offset_px,
            marker.vertical_offset_px,
            marker.scale,
            marker.opacity,
        );
    }
    out
}

pub fn render_alert(alert: &Alert) -> String {
    format!("! [{}] {}", alert.raised_at.format("%H:%M:%S"), alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_lens_core::layout::GridCell;
    use poi_lens_core::{GeoPoint, OverlayError, Place, PlaceError};

    fn marker(name: &str, distance_km: f64, x: f64) -> MarkerPlacement {
        let center = GeoPoint::new(40.0, 29.0);
        let mut place = Place::measured_from(center, name, center, vec!["park".to_string()]);
        place.distance_km = distance_km;
        MarkerPlacement {
            place,
            bearing_deg: 12.0,
            horizontal_offset_px: x,
            vertical_offset_px: 80.0,
            scale: 1.0,
            opacity: 0.9,
            cell: GridCell::new(0, 1),
        }
    }

    #[test]
    fn test_empty_strip() {
        assert_eq!(compass_strip(&[], 390.0), format!("[{}]", "-".repeat(STRIP_WIDTH)));
    }

    #[test]
    fn test_strip_edges_and_overlap() {
        let placements = vec![
            marker("near", 0.1, 0.0),
            marker("far", 0.5, 390.0),
            marker("hidden", 0.9, 0.0),
        ];
        let strip = compass_strip(&placements, 390.0);
        let cells: Vec<char> = strip.trim_matches(|c| c == '[' || c == ']').chars().collect();
        assert_eq!(cells.len(), STRIP_WIDTH);
        // the nearest marker wins the shared column
        assert_eq!(cells[0], '1');
        assert_eq!(cells[STRIP_WIDTH - 1], '2');
    }

    #[test]
    fn test_render_placements_lists_markers() {
        let text = render_placements(3, &[marker("Maltepe Sahil", 0.03, 200.0)], 390.0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "frame 3: 1 visible");
        assert!(lines[2].contains("Maltepe Sahil"));
        assert!(lines[2].contains("park"));
        assert!(lines[2].contains("0.03 km"));
    }

    #[test]
    fn test_render_alert() {
        let error: OverlayError = PlaceError::Parse("unexpected end".to_string()).into();
        let line = render_alert(&Alert::new(&error));
        assert!(line.starts_with("! ["));
        assert!(line.ends_with("Could not load nearby places: could not parse place response: unexpected end"));
    }
}

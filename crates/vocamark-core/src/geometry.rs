//! Coordinate conversion and clamping helpers.

use kurbo::{Point, Size};

/// Clamp a desired note position so the whole note stays inside the
/// container: `[0, W - w] x [0, H - h]`.
///
/// A container smaller than the note degenerates to position (0, 0).
pub fn clamp_note_position(desired: Point, container: Size, note: Size) -> Point {
    let max_x = (container.width - note.width).max(0.0);
    let max_y = (container.height - note.height).max(0.0);
    Point::new(desired.x.clamp(0.0, max_x), desired.y.clamp(0.0, max_y))
}

/// Convert a window-space point into container-local coordinates given the
/// container's current on-screen origin. The origin must be read fresh for
/// every event: scrolling and resizing move it.
pub fn window_to_container(window_point: Point, container_origin: Point) -> Point {
    Point::new(
        window_point.x - container_origin.x,
        window_point.y - container_origin.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_far_outside_container() {
        let pos = clamp_note_position(
            Point::new(5000.0, 5000.0),
            Size::new(800.0, 600.0),
            Size::new(200.0, 80.0),
        );
        assert_eq!(pos, Point::new(600.0, 520.0));
    }

    #[test]
    fn test_clamp_negative_coordinates() {
        let pos = clamp_note_position(
            Point::new(-40.0, -1.0),
            Size::new(800.0, 600.0),
            Size::new(200.0, 80.0),
        );
        assert_eq!(pos, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let pos = clamp_note_position(
            Point::new(120.0, 333.0),
            Size::new(800.0, 600.0),
            Size::new(200.0, 80.0),
        );
        assert_eq!(pos, Point::new(120.0, 333.0));
    }

    #[test]
    fn test_clamp_container_smaller_than_note() {
        let pos = clamp_note_position(
            Point::new(50.0, 50.0),
            Size::new(100.0, 40.0),
            Size::new(200.0, 80.0),
        );
        assert_eq!(pos, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_window_to_container_accounts_for_origin() {
        let local = window_to_container(Point::new(300.0, 250.0), Point::new(100.0, -50.0));
        assert_eq!(local, Point::new(200.0, 300.0));
    }
}

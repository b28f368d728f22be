//! Axis-aligned rectangle collision shared by every client's local
//! simulation. The server never arbitrates collisions.

/// Axis-aligned rectangle in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Overlap test with the character rectangle `a` shrunk by `inset` on all
/// sides before testing against `b`. Edges that merely touch after the
/// inset do not count as a collision.
pub fn overlaps_with_inset(a: &Rect, b: &Rect, inset: f32) -> bool {
    a.x + inset < b.x + b.w
        && a.x + a.w - inset > b.x
        && a.y + inset < b.y + b.h
        && a.y + a.h - inset > b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_overlap() {
        let a = Rect::new(0.0, 0.0, 90.0, 90.0);
        let b = Rect::new(50.0, 50.0, 64.0, 512.0);
        assert!(overlaps_with_inset(&a, &b, 8.0));
    }

    #[test]
    fn test_no_overlap_when_apart() {
        let a = Rect::new(0.0, 0.0, 90.0, 90.0);
        let b = Rect::new(300.0, 0.0, 64.0, 512.0);
        assert!(!overlaps_with_inset(&a, &b, 8.0));
    }

    #[test]
    fn test_touching_edges_after_inset_do_not_collide() {
        // a's right edge minus the inset lands exactly on b's left edge.
        let a = Rect::new(0.0, 0.0, 90.0, 90.0);
        let b = Rect::new(82.0, 0.0, 64.0, 512.0);
        assert!(!overlaps_with_inset(&a, &b, 8.0));

        // One unit closer and they overlap.
        let b = Rect::new(81.0, 0.0, 64.0, 512.0);
        assert!(overlaps_with_inset(&a, &b, 8.0));
    }

    #[test]
    fn test_vertical_touching_after_inset() {
        let a = Rect::new(0.0, 0.0, 90.0, 90.0);
        let b = Rect::new(0.0, 82.0, 64.0, 512.0);
        assert!(!overlaps_with_inset(&a, &b, 8.0));

        let b = Rect::new(0.0, 81.0, 64.0, 512.0);
        assert!(overlaps_with_inset(&a, &b, 8.0));
    }

    #[test]
    fn test_inset_shrinks_only_first_rect() {
        // Inside the 8-unit margin overlap exists geometrically but not
        // after the inset is applied to `a`.
        let a = Rect::new(0.0, 0.0, 90.0, 90.0);
        let b = Rect::new(85.0, 0.0, 64.0, 512.0);
        assert!(!overlaps_with_inset(&a, &b, 8.0));
        assert!(overlaps_with_inset(&a, &b, 0.0));
    }
}

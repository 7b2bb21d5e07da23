//! Clip-path geometry for the five photo masks.
//!
//! Everything here is pure: the same shape and bounding box always yield the
//! same path. Paths are expressed in the bounding box's coordinate space and
//! centred on its centre.

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

pub mod hit_testing;

/// Inner radius of the star as a fraction of the outer radius
pub const STAR_INNER_RATIO: f32 = 0.4;
pub const STAR_POINTS: usize = 5;
pub const HEXAGON_SIDES: usize = 6;

/// Mask applied to the photo at export time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Square,
    Circle,
    Triangle,
    Hexagon,
    Star,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Square,
        Shape::Circle,
        Shape::Triangle,
        Shape::Hexagon,
        Shape::Star,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Square => "square",
            Shape::Circle => "circle",
            Shape::Triangle => "triangle",
            Shape::Hexagon => "hexagon",
            Shape::Star => "star",
        }
    }

    /// Symbol used on the shape picker buttons
    pub fn icon(self) -> &'static str {
        match self {
            Shape::Square => "⬛",
            Shape::Circle => "⚫",
            Shape::Triangle => "▲",
            Shape::Hexagon => "⬢",
            Shape::Star => "★",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("unknown shape: {s}"))
    }
}

/// A closed clip boundary. Polygons are implicitly closed back to their
/// first vertex; no variant ever has an open subpath.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipPath {
    Rect(Rect),
    Circle { center: Pos2, radius: f32 },
    Polygon(Vec<Pos2>),
}

impl ClipPath {
    /// Polygon vertices in drawing order. Empty for rects and circles.
    pub fn vertices(&self) -> &[Pos2] {
        match self {
            ClipPath::Polygon(points) => points,
            _ => &[],
        }
    }

    /// True if `pos` lies inside the boundary (edges count as inside).
    pub fn contains(&self, pos: Pos2) -> bool {
        match self {
            ClipPath::Rect(rect) => rect.contains(pos),
            ClipPath::Circle { center, radius } => center.distance_sq(pos) <= radius * radius,
            ClipPath::Polygon(points) => polygon_contains(points, pos),
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        match self {
            ClipPath::Rect(rect) => *rect,
            ClipPath::Circle { center, radius } => {
                Rect::from_center_size(*center, egui::vec2(radius * 2.0, radius * 2.0))
            }
            ClipPath::Polygon(points) => Rect::from_points(points),
        }
    }
}

/// Computes the clip path for `shape` inside `bounds`.
///
/// `size` is half the shorter side of the box. The hexagon's first vertex
/// points right (angle 0), unlike the star whose first vertex points up.
pub fn clip_path(shape: Shape, bounds: Rect) -> ClipPath {
    let center = bounds.center();
    let size = bounds.width().min(bounds.height()) / 2.0;

    match shape {
        Shape::Square => ClipPath::Rect(bounds),
        Shape::Circle => ClipPath::Circle {
            center,
            radius: size,
        },
        Shape::Triangle => ClipPath::Polygon(vec![
            Pos2::new(center.x, center.y - size),
            Pos2::new(center.x - size, center.y + size),
            Pos2::new(center.x + size, center.y + size),
        ]),
        Shape::Hexagon => ClipPath::Polygon(
            (0..HEXAGON_SIDES)
                .map(|i| polar(center, size, i as f32 * TAU / HEXAGON_SIDES as f32))
                .collect(),
        ),
        Shape::Star => ClipPath::Polygon(star_vertices(center, size)),
    }
}

/// Alternating outer/inner vertices starting straight up, `PI / 5` apart.
fn star_vertices(center: Pos2, size: f32) -> Vec<Pos2> {
    let step = PI / STAR_POINTS as f32;
    let inner = size * STAR_INNER_RATIO;

    (0..STAR_POINTS * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { size } else { inner };
            polar(center, radius, -PI / 2.0 + i as f32 * step)
        })
        .collect()
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    Pos2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Crossing-number test. The shapes built here never self-intersect, so
/// even-odd and non-zero agree.
fn polygon_contains(points: &[Pos2], pos: Pos2) -> bool {
    if points.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > pos.y) != (b.y > pos.y) {
            let x_cross = (b.x - a.x) * (pos.y - a.y) / (b.y - a.y) + a.x;
            if pos.x <= x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Pos2, b: Pos2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    fn box_200() -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(200.0, 200.0))
    }

    #[test]
    fn test_square_is_bounding_box() {
        let bounds = Rect::from_min_size(Pos2::new(10.0, 20.0), egui::vec2(300.0, 150.0));
        assert_eq!(clip_path(Shape::Square, bounds), ClipPath::Rect(bounds));
    }

    #[test]
    fn test_circle_uses_shorter_side() {
        let bounds = Rect::from_min_size(Pos2::ZERO, egui::vec2(300.0, 200.0));
        match clip_path(Shape::Circle, bounds) {
            ClipPath::Circle { center, radius } => {
                assert!(approx(center, Pos2::new(150.0, 100.0)));
                assert_eq!(radius, 100.0);
            }
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn test_triangle_vertices() {
        let path = clip_path(Shape::Triangle, box_200());
        let v = path.vertices();
        assert_eq!(v.len(), 3);
        assert!(approx(v[0], Pos2::new(100.0, 0.0)));
        assert!(approx(v[1], Pos2::new(0.0, 200.0)));
        assert!(approx(v[2], Pos2::new(200.0, 200.0)));
    }

    // The hexagon keeps a vertex pointing right rather than up. Existing
    // exports were produced with this orientation.
    #[test]
    fn test_hexagon_points_right() {
        let path = clip_path(Shape::Hexagon, box_200());
        let v = path.vertices();
        assert_eq!(v.len(), 6);
        assert!(approx(v[0], Pos2::new(200.0, 100.0)));
        assert!(approx(v[3], Pos2::new(0.0, 100.0)));
        for point in v {
            assert!((point.distance(Pos2::new(100.0, 100.0)) - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_star_vertices_alternate() {
        let bounds = Rect::from_center_size(Pos2::ZERO, egui::vec2(200.0, 200.0));
        let path = clip_path(Shape::Star, bounds);
        let v = path.vertices();
        assert_eq!(v.len(), 10);
        assert!(approx(v[0], Pos2::new(0.0, -100.0)));

        for (i, point) in v.iter().enumerate() {
            let expected = if i % 2 == 0 { 100.0 } else { 40.0 };
            assert!((point.distance(Pos2::ZERO) - expected).abs() < 1e-3);
        }

        let topmost = v
            .iter()
            .min_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap();
        assert!(approx(*topmost, Pos2::new(0.0, -100.0)));
    }

    #[test]
    fn test_clip_path_is_deterministic() {
        for shape in Shape::ALL {
            assert_eq!(clip_path(shape, box_200()), clip_path(shape, box_200()));
        }
    }

    #[test]
    fn test_contains() {
        let center = Pos2::new(100.0, 100.0);
        let corner = Pos2::new(2.0, 2.0);
        for shape in Shape::ALL {
            let path = clip_path(shape, box_200());
            assert!(path.contains(center), "{shape} should contain its centre");
            if shape != Shape::Square {
                assert!(!path.contains(corner), "{shape} should not contain the corner");
            }
        }
        // Between two star points, outside the inner radius
        let star = clip_path(Shape::Star, box_200());
        assert!(!star.contains(Pos2::new(100.0, 160.0)));
    }

    #[test]
    fn test_shape_round_trips_through_str() {
        for shape in Shape::ALL {
            assert_eq!(shape.as_str().parse::<Shape>(), Ok(shape));
        }
        assert!("pentagon".parse::<Shape>().is_err());
    }
}

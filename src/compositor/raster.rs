//! Conversion of clip geometry into tiny-skia paths and masks.

use tiny_skia::{FillRule, Mask, Path, PathBuilder, Transform};

use crate::geometry::ClipPath;

/// Control-point distance for approximating a quarter circle with a cubic
pub const BEZIER_K: f32 = 0.552_284_8;

/// Builds a closed tiny-skia path for `clip`. Returns `None` for degenerate
/// input (zero-area rects, zero radius, fewer than three vertices).
pub fn build_clip_path(clip: &ClipPath) -> Option<Path> {
    let mut pb = PathBuilder::new();

    match clip {
        ClipPath::Rect(rect) => {
            pb.move_to(rect.min.x, rect.min.y);
            pb.line_to(rect.max.x, rect.min.y);
            pb.line_to(rect.max.x, rect.max.y);
            pb.line_to(rect.min.x, rect.max.y);
        }
        ClipPath::Circle { center, radius } => {
            return build_circle_path(center.x, center.y, *radius);
        }
        ClipPath::Polygon(points) => {
            let (first, rest) = points.split_first()?;
            if rest.len() < 2 {
                return None;
            }
            pb.move_to(first.x, first.y);
            for point in rest {
                pb.line_to(point.x, point.y);
            }
        }
    }

    pb.close();
    pb.finish()
}

/// Circle from four cubic bezier quadrants, starting at the top
fn build_circle_path(cx: f32, cy: f32, r: f32) -> Option<Path> {
    if r <= 0.0 {
        return None;
    }
    let k = r * BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy - r);
    pb.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
    pb.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
    pb.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
    pb.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
    pb.close();
    pb.finish()
}

/// Rasterizes `clip` into an anti-aliased coverage mask of the given size.
pub fn clip_mask(clip: &ClipPath, width: u32, height: u32) -> Option<Mask> {
    let path = build_clip_path(clip)?;
    let mut mask = Mask::new(width, height)?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    Some(mask)
}

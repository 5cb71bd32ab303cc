//! Point, rect and transform math shared by the scene components.

use kurbo::{Affine, Rect, Vec2};

/// Tolerance below which a decomposed skew is treated as zero.
const SKEW_EPSILON: f64 = 1e-9;

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360.
    if 360.0 - wrapped < 1e-9 { 0.0 } else { wrapped }
}

/// Compose translate, rotate (degrees) and scale, applied scale first.
pub fn compose(left: f64, top: f64, angle: f64, scale_x: f64, scale_y: f64) -> Affine {
    Affine::translate(Vec2::new(left, top))
        * Affine::rotate(angle.to_radians())
        * Affine::scale_non_uniform(scale_x, scale_y)
}

/// The parts of an affine matrix, as produced by [`decompose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub left: f64,
    pub top: f64,
    /// Rotation in degrees, `[0, 360)`.
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Horizontal shear factor left over after rotation and scale.
    pub skew: f64,
}

impl Decomposed {
    pub fn has_skew(&self) -> bool {
        self.skew.abs() > SKEW_EPSILON
    }
}

/// Split an affine matrix into translation, rotation, scale and shear
/// (QR decomposition). The inverse of [`compose`] whenever `skew` is zero.
pub fn decompose(affine: Affine) -> Decomposed {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let scale_x = a.hypot(b);
    if scale_x < f64::EPSILON {
        return Decomposed {
            left: e,
            top: f,
            angle: 0.0,
            scale_x: 0.0,
            scale_y: c.hypot(d),
            skew: 0.0,
        };
    }
    let angle = normalize_angle(b.atan2(a).to_degrees());
    let scale_y = (a * d - b * c) / scale_x;
    let shear = (a * c + b * d) / scale_x;
    let skew = if scale_y.abs() > f64::EPSILON {
        shear / scale_y
    } else {
        0.0
    };
    Decomposed {
        left: e,
        top: f,
        angle,
        scale_x,
        scale_y,
        skew,
    }
}

/// Union of a set of rectangles, `None` when the set is empty.
pub fn union_rects<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

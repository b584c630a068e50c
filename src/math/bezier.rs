use super::Vec2;

/// Point on the quadratic bezier `start → control → end` at parameter t
pub fn quadratic_point(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let t = t.clamp(0.0, 1.0);
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

/// Leading part `[0, t]` of a quadratic bezier, returned as `(control, end)`.
///
/// De Casteljau split: the sub-curve keeps `start` and is itself a quadratic,
/// so a partially grown branch can be stroked with a single curve command.
pub fn split_quadratic(start: Vec2, control: Vec2, end: Vec2, t: f32) -> (Vec2, Vec2) {
    let t = t.clamp(0.0, 1.0);
    let sub_control = start.lerp(&control, t);
    let sub_end = quadratic_point(start, control, end, t);
    (sub_control, sub_end)
}

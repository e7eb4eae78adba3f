/// Shared resize contract of everything that follows the terminal size.
///
/// Deltas are relative; resulting sizes never drop below zero.
pub trait Resize {
    fn resize(&mut self, dy: i32, dx: i32);
}

/// Applies a signed delta to a size, flooring at zero.
pub fn apply_delta(value: usize, delta: i32) -> usize {
    if delta < 0 {
        value.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        value.saturating_add(delta as usize)
    }
}

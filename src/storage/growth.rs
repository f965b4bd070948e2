//! The growth policy: a pure function from current and required capacity to new capacity.
//!
//! Growth is geometric so that N sequential pushes cost O(N) element moves in total, with the
//! ratio given as a rational `num/den` (at least `1/1`). The arithmetic saturates at the
//! maximum representable element count instead of overflowing; actual allocation failure is
//! reported later, at the allocation step, never here.

/// Computes the capacity to grow to, given the current capacity and the required minimum.
///
/// The policy: take `base = max(old_cap, 1)` so growth never stalls at zero, scale it by
/// `num/den` rounding down, clamp the result to `max`, then raise it to `required` if the
/// geometric step fell short. The canonical `3/2` ratio takes a dedicated path (`base + base/2`)
/// that cannot overflow; other ratios go through a checked multiply that saturates to `max`.
///
/// Callers are expected to invoke this only when `required > old_cap`, and to have already
/// rejected `required > max` as a size overflow; under those preconditions the result never
/// exceeds `max`.
///
/// # Examples
/// ```
/// # use array_base::storage::growth::grow;
/// let max = usize::MAX;
/// assert_eq!(grow(0, 1, max, 3, 2), 1);
/// assert_eq!(grow(1, 2, max, 3, 2), 2);
/// assert_eq!(grow(2, 3, max, 3, 2), 3);
/// assert_eq!(grow(3, 4, max, 3, 2), 4);
/// assert_eq!(grow(100, 101, max, 3, 2), 150);
/// assert_eq!(grow(max, max, max, 3, 2), max);
/// ```
pub const fn grow(old_cap: usize, required: usize, max: usize, num: usize, den: usize) -> usize {
    debug_assert!(num >= den && den >= 1);

    let base = if old_cap == 0 { 1 } else { old_cap };

    let candidate = if num == 3 && den == 2 {
        base.saturating_add(base / 2)
    } else {
        match base.checked_mul(num - den) {
            Some(scaled) => base.saturating_add(scaled / den),
            None => max,
        }
    };

    let candidate = if candidate > max { max } else { candidate };

    if candidate < required {
        required
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::grow;

    #[test]
    fn test_three_halves_sequence() {
        let max = usize::MAX;
        let mut cap = 0;
        let mut seen = [0; 4];

        for (i, slot) in seen.iter_mut().enumerate() {
            cap = grow(cap, i + 1, max, 3, 2);
            *slot = cap;
        }

        assert_eq!(
            seen,
            [1, 2, 3, 4],
            "Each step should be geometric, raised to the requirement while small."
        );
    }

    #[test]
    fn test_five_thirds_sequence() {
        let max = usize::MAX;
        let mut cap = 0;
        let mut seen = [0; 4];

        for (i, slot) in seen.iter_mut().enumerate() {
            cap = grow(cap, i + 1, max, 5, 3);
            *slot = cap;
        }

        assert_eq!(
            seen,
            [1, 2, 3, 5],
            "A 5/3 engine should produce the wider early sequence."
        );
    }

    #[test]
    fn test_requirement_dominates() {
        assert_eq!(
            grow(4, 100, usize::MAX, 3, 2),
            100,
            "A requirement beyond the geometric step should win."
        );
    }

    #[test]
    fn test_never_shrinks_below_requirement_at_identity_ratio() {
        assert_eq!(
            grow(7, 8, usize::MAX, 1, 1),
            8,
            "A 1/1 ratio degenerates to exact growth."
        );
    }

    #[test]
    fn test_saturation() {
        let max = 1 << 20;
        assert_eq!(
            grow(max, max, max, 3, 2),
            max,
            "Growth at the maximum should stay at the maximum."
        );
        assert_eq!(
            grow(usize::MAX, usize::MAX, usize::MAX, 7, 2),
            usize::MAX,
            "A ratio whose multiply overflows should saturate."
        );
        assert_eq!(
            grow(max - 1, max, max, 3, 2),
            max,
            "A near-maximum capacity should clamp to the maximum."
        );
    }
}

//! Stack growth for the recursive parser and evaluator.
//!
//! Deeply nested source recurses once per nesting level. Wrapping those
//! recursive entry points in [`ensure_sufficient_stack`] moves the limit from
//! the host thread's stack size to the configured depth guard.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nest(depth: usize) -> usize {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { 1 + nest(depth - 1) })
    }

    #[test]
    fn test_deep_recursion_does_not_overflow() {
        assert_eq!(nest(100_000), 100_000);
    }
}

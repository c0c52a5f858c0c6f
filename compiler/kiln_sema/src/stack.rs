//! Stack growth for the recursive dispatcher.
//!
//! Nested forms recurse through [`FormProcessor::process`](crate::FormProcessor::process)
//! once per level, and macro expansion can nest arbitrarily deep. Every
//! recursive entry point is wrapped in [`ensure_sufficient_stack`].

/// Grow when less than this remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the red zone has been reached.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

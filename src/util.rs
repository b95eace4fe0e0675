//! Iterator helpers.

/// Advances `iter` by `n` steps, or drains it completely when `n` is `None`.
///
/// Useful for driving iterators that are run purely for their side effects.
pub fn consume<I: Iterator>(iter: &mut I, n: Option<usize>) {
    match n {
        None => iter.for_each(drop),
        Some(0) => {}
        Some(n) => {
            iter.nth(n - 1);
        }
    }
}

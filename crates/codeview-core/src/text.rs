/// `offset` moved by `delta`, clamped at zero.
pub(crate) fn shift(offset: usize, delta: isize) -> usize {
    offset.checked_add_signed(delta).unwrap_or(0)
}

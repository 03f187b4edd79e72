use num_traits::Float;
use std::cmp::Ordering;

#[inline]
fn ascending<F: Float>(a: &F, b: &F) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Sorts a copy of `values` ascending.
pub fn sorted<F: Float>(values: &[F]) -> Vec<F> {
    let mut values = values.to_vec();
    values.sort_by(ascending);
    values
}

/// Median of `values`, averaging the two middle elements for even counts.
pub fn median<F: Float>(values: &[F]) -> Option<F> {
    if values.is_empty() {
        return None;
    }

    let values = sorted(values);
    let mid = values.len() / 2;

    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let two = F::one() + F::one();
        Some((values[mid - 1] + values[mid]) / two)
    }
}

/// Index of the element sitting at `percentile` in a sorted list of `count`
/// items, counting the percentile boundary itself as inside.
///
/// With percentile 80 a 10 item list gives 7 and a 5 item list gives 3.
/// Returns `None` when the index falls outside `0..count`.
pub fn percentile_index(count: usize, percentile: u32) -> Option<usize> {
    let percentile_count = (count * percentile as usize) / 100;
    if percentile_count == 0 || percentile_count > count {
        return None;
    }

    Some(percentile_count - 1)
}

/// Value at `(count * percentile) / 100` of the ascending `values`, clamped
/// to the last element.
pub fn percentile_value<F: Float>(values: &[F], percentile: u32) -> Option<F> {
    if values.is_empty() {
        return None;
    }

    let values = sorted(values);
    let idx = ((values.len() * percentile as usize) / 100).min(values.len() - 1);

    Some(values[idx])
}

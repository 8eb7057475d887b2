//! Range check shared by every numeric constraint.

/// Checks `actual` against `[min, max]`, where a zero bound means
/// "unbounded on that side".
pub fn in_range<T>(min: T, max: T, actual: T) -> bool
where
    T: PartialOrd + Default,
{
    let zero = T::default();
    if min > zero && actual < min {
        return false;
    }
    if max > zero && actual > max {
        return false;
    }
    true
}

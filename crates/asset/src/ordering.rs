//! Numeric ordering of array members by the digits embedded in their names.
//!
//! The magnitude of a name is the integer formed by concatenating every ASCII
//! digit in it, ignoring everything else: `tile_2b` and `tile2b` both give 2.
//! Magnitudes are `u64`; a name whose digits do not fit is an error.

use corelib::OrderingError;

/// Concatenated digits of `name` as an integer, 0 if there are none.
pub fn magnitude(name: &str) -> Result<u64, OrderingError> {
    name.bytes()
        .filter(u8::is_ascii_digit)
        .try_fold(0u64, |acc, digit| {
            acc.checked_mul(10)?.checked_add(u64::from(digit - b'0'))
        })
        .ok_or_else(|| OrderingError::DigitOverflow {
            name: name.to_string(),
        })
}

/// `name` with every ASCII digit removed; `Leaf1` and `Leaf2` both give `Leaf`.
pub fn array_key(name: &str) -> String {
    name.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Stable sort of `items` by the magnitude of `name_of(item)`, ascending.
///
/// All keys are computed before anything moves. If any key overflows, `items`
/// keeps its input order and the error is returned.
pub fn sort_by_magnitude<T>(
    items: &mut [T],
    name_of: impl Fn(&T) -> &str,
) -> Result<(), OrderingError> {
    let keys = items
        .iter()
        .map(|item| magnitude(name_of(item)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| keys[i]);
    apply_permutation(items, order);
    Ok(())
}

/// Rearrange `items` so that position `i` holds the element previously at `order[i]`.
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..order.len() {
        let mut current = start;
        while order[current] != start {
            let next = order[current];
            items.swap(current, next);
            order[current] = current;
            current = next;
        }
        order[current] = current;
    }
}

//! Read cache for `^N` back-references.
//!
//! Writers replace repeated keywords, symbols, tags and long map keys with a
//! short code naming the slot where the first occurrence was stored. Slots are
//! assigned in document order and the cache wraps once all 44×44 slots are
//! used.

use crate::error::TransitError;

const BASE_CHAR: u32 = 48;
const CACHE_CODE_DIGITS: usize = 44;
const MAX_ENTRIES: usize = CACHE_CODE_DIGITS * CACHE_CODE_DIGITS;
const MIN_CACHEABLE_LEN: usize = 3;

/// Marker that introduces a map written as a flat array.
pub(crate) const MAP_AS_ARRAY: &str = "^ ";

/// Whether a string read at this position must be remembered.
pub(crate) fn is_cacheable(raw: &str, as_map_key: bool) -> bool {
    if raw.len() <= MIN_CACHEABLE_LEN {
        return false;
    }
    as_map_key || raw.starts_with("~:") || raw.starts_with("~$") || raw.starts_with("~#")
}

/// Whether a string is a back-reference rather than a literal.
pub(crate) fn is_cache_code(raw: &str) -> bool {
    raw.starts_with('^') && raw != MAP_AS_ARRAY
}

/// Converts a cache code such as `^0` or `^1A` into a slot index.
pub(crate) fn code_to_index(code: &str) -> Option<usize> {
    let mut digits = code.strip_prefix('^')?.chars();
    let first = digit(digits.next()?)?;
    match (digits.next(), digits.next()) {
        (None, _) => Some(first),
        (Some(second), None) => Some(first * CACHE_CODE_DIGITS + digit(second)?),
        _ => None,
    }
}

/// Inverse of [`code_to_index`]; used by tests to build cached documents.
#[cfg(test)]
pub(crate) fn index_to_code(index: usize) -> String {
    let char_for = |n: usize| {
        u32::try_from(n)
            .ok()
            .and_then(|n| char::from_u32(n + BASE_CHAR))
            .unwrap_or('0')
    };
    if index < CACHE_CODE_DIGITS {
        format!("^{}", char_for(index))
    } else {
        format!(
            "^{}{}",
            char_for(index / CACHE_CODE_DIGITS),
            char_for(index % CACHE_CODE_DIGITS)
        )
    }
}

fn digit(c: char) -> Option<usize> {
    let offset = u32::from(c).checked_sub(BASE_CHAR)?;
    let offset = usize::try_from(offset).ok()?;
    (offset < CACHE_CODE_DIGITS).then_some(offset)
}

/// Slots populated while decoding a single document.
#[derive(Debug)]
pub(crate) struct ReadCache<T> {
    slots: Vec<T>,
    next: usize,
}

impl<T: Clone> ReadCache<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            next: 0,
        }
    }

    pub(crate) fn write(&mut self, entry: T) {
        if self.next == MAX_ENTRIES {
            self.next = 0;
        }
        if self.next < self.slots.len() {
            if let Some(slot) = self.slots.get_mut(self.next) {
                *slot = entry;
            }
        } else {
            self.slots.push(entry);
        }
        self.next += 1;
    }

    pub(crate) fn read(&self, code: &str) -> Result<T, TransitError> {
        code_to_index(code)
            .and_then(|index| self.slots.get(index).cloned())
            .ok_or_else(|| TransitError::CacheMiss {
                code: code.to_owned(),
            })
    }
}

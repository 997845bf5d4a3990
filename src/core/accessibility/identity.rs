//! Opaque accessibility identities and their allocator.

use std::fmt;
use std::num::NonZeroU32;

use crate::core::errors::AccessibilityError;

/// Opaque handle given to assistive technology clients.
///
/// Never zero; `Option<Identity>` stands in for the "invalid" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(NonZeroU32);

impl Identity {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0.get())
    }
}

/// Half-open range `[first, end)` identities are drawn from.
///
/// The default keeps identities above `i32::MAX` so they never collide with
/// child indices, and leaves out the two topmost values, which some platform
/// bridges reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRange {
    first: u32,
    end: u32,
}

impl IdentityRange {
    /// Returns `None` for empty ranges or ranges that include zero.
    pub fn new(first: u32, end: u32) -> Option<Self> {
        (first > 0 && first < end).then_some(Self { first, end })
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn capacity(&self) -> usize {
        (self.end - self.first) as usize
    }

    pub fn contains(&self, raw: u32) -> bool {
        raw >= self.first && raw < self.end
    }

    fn after(&self, raw: u32) -> u32 {
        if raw + 1 >= self.end {
            self.first
        } else {
            raw + 1
        }
    }
}

impl Default for IdentityRange {
    fn default() -> Self {
        Self {
            first: i32::MAX as u32 + 1,
            end: u32::MAX - 1,
        }
    }
}

/// Wrapping cursor over an [`IdentityRange`].
#[derive(Debug, Clone)]
pub struct IdentityAllocator {
    range: IdentityRange,
    cursor: u32,
}

impl IdentityAllocator {
    pub fn new(range: IdentityRange) -> Self {
        Self {
            range,
            cursor: range.first,
        }
    }

    pub fn range(&self) -> IdentityRange {
        self.range
    }

    /// Next identity for which `is_live` is false.
    ///
    /// `live` is the number of identities currently in use; when it reaches
    /// the range capacity no free value exists and the call fails instead of
    /// spinning.
    pub fn acquire(
        &mut self,
        live: usize,
        is_live: impl Fn(Identity) -> bool,
    ) -> Result<Identity, AccessibilityError> {
        if live >= self.range.capacity() {
            return Err(AccessibilityError::IdentitySpaceExhausted { live });
        }
        loop {
            let raw = self.cursor;
            self.cursor = self.range.after(raw);
            // Ranges never include zero.
            let Some(identity) = Identity::new(raw) else {
                continue;
            };
            if !is_live(identity) {
                return Ok(identity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_range_is_above_int_max() {
        let range = IdentityRange::default();
        assert_eq!(range.first(), 0x8000_0000);
        assert!(!range.contains(0));
        assert!(!range.contains(i32::MAX as u32));
        assert!(!range.contains(u32::MAX));
        assert!(!range.contains(u32::MAX - 1));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(IdentityRange::new(0, 10).is_none());
        assert!(IdentityRange::new(5, 5).is_none());
        assert!(IdentityRange::new(5, 6).is_some());
    }

    #[test]
    fn test_acquire_skips_live_and_wraps() {
        let range = IdentityRange::new(10, 14).unwrap();
        let mut allocator = IdentityAllocator::new(range);
        let live: HashSet<u32> = [10, 11].into_iter().collect();

        let id = allocator.acquire(live.len(), |id| live.contains(&id.get())).unwrap();
        assert_eq!(id.get(), 12);
        let id = allocator.acquire(live.len(), |id| live.contains(&id.get())).unwrap();
        assert_eq!(id.get(), 13);
        // Wraps to the start, skipping 10 and 11 again.
        let id = allocator.acquire(live.len(), |id| live.contains(&id.get())).unwrap();
        assert_eq!(id.get(), 12);
    }

    #[test]
    fn test_exhausted_range_fails() {
        let range = IdentityRange::new(1, 3).unwrap();
        let mut allocator = IdentityAllocator::new(range);
        let result = allocator.acquire(2, |_| true);
        assert_eq!(result, Err(AccessibilityError::IdentitySpaceExhausted { live: 2 }));
    }
}

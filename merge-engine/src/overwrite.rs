//! Literal overwrite for binary and unrecognized files.

use crate::types::{MergeResult, MergeScenario, MergeStrategy};

/// Take the updated template verbatim. Never conflicts.
pub fn merge_overwrite(scenario: &MergeScenario<&[u8]>) -> MergeResult {
    MergeResult::clean(scenario.updated, MergeStrategy::Overwrite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_updated_bytes() {
        let base = [0x89u8, b'P', b'N', b'G'];
        let current = [0x89u8, b'P', b'N', b'G', 0x00];
        let updated = [0xffu8, 0xfe, 0x00];
        let result = merge_overwrite(&MergeScenario::new(&base[..], &current[..], &updated[..]));
        assert_eq!(result.content, updated);
        assert!(!result.has_conflict());
        assert_eq!(result.strategy, MergeStrategy::Overwrite);
    }
}

//! Engine-facing entry points
//!
//! Everything here is synchronous and free of I/O: snapshots go in, patch sets
//! and apply results come out. Callers are free to run independent
//! invocations (one per variant, say) on as many threads as they like.

pub use crate::artifacts::apply::{ApplyResult, Conflict, ConflictReason, FuzzConfig};
pub use crate::artifacts::diff::DiffConfig;
pub use crate::artifacts::errors::{PatchError, PatchResult};
pub use crate::artifacts::hunk::{Hunk, HunkLine, LineOp};
pub use crate::artifacts::patch::{FileOp, FilePatch, PatchSet};
pub use crate::artifacts::report::ConflictReport;
pub use crate::artifacts::script::{PatchScript, ScriptSet};
pub use crate::artifacts::snapshot::file_content::{ContentKind, FileContent};
pub use crate::artifacts::snapshot::tree_snapshot::FileTreeSnapshot;

use crate::artifacts::{apply as applier, diff as differ, patch::codec, script};

/// Compute the patch set turning `base` into `variant`
pub fn diff(base: &FileTreeSnapshot, variant: &FileTreeSnapshot, config: &DiffConfig) -> PatchSet {
    differ::diff_trees(base, variant, config)
}

pub fn encode(patch_set: &PatchSet) -> String {
    codec::encode(patch_set)
}

pub fn decode(text: &str) -> PatchResult<PatchSet> {
    codec::decode(text)
}

pub fn decode_named(source_name: &str, text: &str) -> PatchResult<PatchSet> {
    codec::decode_named(source_name, text)
}

/// Rebuild a variant from `base`; per-hunk failures land in [`ApplyResult::conflicts`]
pub fn apply(base: &FileTreeSnapshot, patch_set: &PatchSet, fuzz: &FuzzConfig) -> PatchResult<ApplyResult> {
    applier::apply_patch_set(base, patch_set, fuzz)
}

pub fn apply_scripts(base: &FileTreeSnapshot, scripts: &ScriptSet) -> PatchResult<ApplyResult> {
    script::apply_scripts(base, scripts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use proptest::prelude::*;

    fn text_strategy() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "", "x y"]), 0..12),
            any::<bool>(),
        )
            .prop_map(|(lines, trailing_newline)| {
                let mut text = lines.join("\n");
                if trailing_newline && !lines.is_empty() {
                    text.push('\n');
                }
                text
            })
    }

    fn content_strategy() -> impl Strategy<Value = FileContent> {
        prop_oneof![
            4 => text_strategy().prop_map(|text| FileContent::from_text(&text)),
            1 => prop::collection::vec(any::<u8>(), 0..80)
                .prop_map(|data| FileContent::from_bytes(Bytes::from(data))),
        ]
    }

    fn tree_strategy() -> impl Strategy<Value = FileTreeSnapshot> {
        prop::collection::btree_map(
            prop::sample::select(vec!["a.txt", "b.txt", "dir/c.txt", "dir/d.bin"]),
            content_strategy(),
            0..4,
        )
        .prop_map(FileTreeSnapshot::from_iter)
    }

    proptest! {
        #[test]
        fn prop_diffing_a_tree_with_itself_is_empty(tree in tree_strategy()) {
            prop_assert!(diff(&tree, &tree, &DiffConfig::default()).is_empty());
        }

        #[test]
        fn prop_encoded_patch_sets_decode_to_themselves(base in tree_strategy(), variant in tree_strategy()) {
            let patch_set = diff(&base, &variant, &DiffConfig::default());
            let decoded = decode(&encode(&patch_set));
            prop_assert_eq!(decoded, Ok(patch_set));
        }

        #[test]
        fn prop_applying_a_diff_rebuilds_the_variant(
            base in tree_strategy(),
            variant in tree_strategy(),
            context_lines in 0usize..4,
        ) {
            let config = DiffConfig::new(context_lines, true, 0.5);
            let patch_set = diff(&base, &variant, &config);

            let result = apply(&base, &patch_set, &FuzzConfig::exact()).unwrap();

            prop_assert!(result.is_clean(), "conflicts: {:?}", result.conflicts);
            prop_assert_eq!(result.resulting_tree, variant);
        }
    }
}

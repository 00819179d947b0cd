use derive_new::new;

/// Default number of unchanged lines kept on each side of a hunk
pub const DEFAULT_CONTEXT_LINES: usize = 3;
/// Default minimum similarity for pairing a deleted and an added file as a rename
pub const DEFAULT_RENAME_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct DiffConfig {
    pub context_lines: usize,
    pub detect_renames: bool,
    pub rename_threshold: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            context_lines: DEFAULT_CONTEXT_LINES,
            detect_renames: true,
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
        }
    }
}

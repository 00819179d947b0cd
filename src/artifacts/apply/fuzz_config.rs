/// Highest number of mismatched context lines a hunk may tolerate
pub const MAX_FUZZ: u8 = 2;

/// Tolerance used when relocating hunks in a drifted base file
///
/// `search_radius` of `None` searches as far as the patched file is long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FuzzConfig {
    max_fuzz: u8,
    search_radius: Option<usize>,
}

impl FuzzConfig {
    pub fn new(max_fuzz: u8, search_radius: Option<usize>) -> Self {
        if max_fuzz > MAX_FUZZ {
            tracing::warn!(requested = max_fuzz, max = MAX_FUZZ, "fuzz clamped");
        }

        FuzzConfig {
            max_fuzz: max_fuzz.min(MAX_FUZZ),
            search_radius,
        }
    }

    /// No fuzz, full-file search
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn max_fuzz(&self) -> usize {
        usize::from(self.max_fuzz)
    }

    pub fn search_radius(&self) -> Option<usize> {
        self.search_radius
    }

    pub fn radius_for(&self, file_len: usize) -> usize {
        self.search_radius.unwrap_or(file_len)
    }
}

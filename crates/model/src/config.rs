use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where the pipeline reads from. `Local` runs load synthetic test data
/// whose timestamps are not monotonic, so progress tracking is off unless
/// forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadMode {
    Local,
    Idr,
}

/// Explicit loader configuration, passed into the constructor instead of
/// read from process environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub load_mode: LoadMode,
    pub batch_size: usize,
    /// Extraction floor for incremental claim-type scans.
    pub min_transaction_date: NaiveDate,
    /// Persist progress even for `Local` runs.
    pub force_load_progress: bool,
}

impl LoaderConfig {
    pub fn track_progress(&self) -> bool {
        self.load_mode == LoadMode::Idr || self.force_load_progress
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            load_mode: LoadMode::Idr,
            batch_size: 100_000,
            min_transaction_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            force_load_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idr_mode_tracks_progress() {
        assert!(LoaderConfig::default().track_progress());
    }

    #[test]
    fn local_mode_skips_progress_unless_forced() {
        let mut config = LoaderConfig {
            load_mode: LoadMode::Local,
            ..Default::default()
        };
        assert!(!config.track_progress());
        config.force_load_progress = true;
        assert!(config.track_progress());
    }
}

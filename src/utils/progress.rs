//! Progress bar over input sources, using indicatif.
//!
//! Sources may be read from several rayon workers at once; indicatif bars
//! are internally synchronised, so one bar is shared by reference.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress across the sources of one run
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Bar with a known number of sources
    pub fn new(total: usize, label: &str) -> Self {
        let bar = IndicatifBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
        {
            bar.set_style(style.progress_chars("█░"));
        }
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// A bar that never draws (quiet runs and tests)
    pub fn hidden() -> Self {
        Self {
            bar: IndicatifBar::hidden(),
        }
    }

    /// One more source finished
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_counts() {
        let bar = ProgressBar::hidden();
        bar.inc();
        bar.inc();
        assert_eq!(bar.position(), 2);
        bar.finish_and_clear();
    }
}

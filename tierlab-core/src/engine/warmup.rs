/// Tracks how far the fold is into the indicator warmup.
///
/// A bar is warm once every rolling window ending on it is full, i.e. once
/// `warmup_bars` earlier bars have been processed.
#[derive(Debug, Clone)]
pub struct WarmupState {
    warmup_bars: usize,
    bars_processed: usize,
}

impl WarmupState {
    pub fn new(warmup_bars: usize) -> Self {
        Self {
            warmup_bars,
            bars_processed: 0,
        }
    }

    pub fn process_bar(&mut self) {
        self.bars_processed += 1;
    }

    /// True when the next bar to be processed has full windows.
    pub fn is_warm(&self) -> bool {
        self.bars_processed >= self.warmup_bars
    }

    pub fn bars_until_warm(&self) -> usize {
        self.warmup_bars.saturating_sub(self.bars_processed)
    }

    pub fn warmup_bars(&self) -> usize {
        self.warmup_bars
    }
}

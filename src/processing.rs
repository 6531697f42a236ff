use log::debug;

use crate::signal_processing::DynFilter;

/// Filters of mixed types applied in sequence to interleaved blocks with a
/// fixed channel count.
pub struct FilterChain<T = f64> {
    filters: Vec<Box<dyn DynFilter<T>>>,
    channels: usize,
    scratch: Vec<T>,
}

impl<T: Copy + Send + 'static> FilterChain<T> {
    pub fn new(channels: usize) -> Self {
        Self::with_filters(channels, Vec::new())
    }

    pub fn with_filters(channels: usize, filters: Vec<Box<dyn DynFilter<T>>>) -> Self {
        debug!(
            "filter chain: {} filters over {} channels",
            filters.len(),
            channels
        );
        Self {
            filters,
            channels,
            scratch: Vec::new(),
        }
    }

    pub fn push(&mut self, filter: Box<dyn DynFilter<T>>) {
        self.filters.push(filter);
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter over `block` in place. A trailing partial frame is
    /// left untouched.
    pub fn process_block(&mut self, block: &mut [T]) {
        for filter in &mut self.filters {
            filter.apply_block(block, self.channels);
        }
    }

    /// Process `interleaved` in chunks of `block_frames` frames and return
    /// the output.
    pub fn process_signal(&mut self, interleaved: &[T], block_frames: usize) -> Vec<T> {
        let mut output = interleaved.to_vec();
        let chunk = (block_frames * self.channels).max(self.channels).max(1);
        for block in output.chunks_mut(chunk) {
            self.process_block(block);
        }
        output
    }

    /// Advance every filter as if `block` had been processed, without
    /// producing output. Intermediate stages still run so later ones see
    /// what they would have seen.
    pub fn dry_run_block(&mut self, block: &[T]) {
        let Some((last, rest)) = self.filters.split_last_mut() else {
            return;
        };
        if rest.is_empty() {
            last.dry_run_block(block, self.channels);
            return;
        }
        self.scratch.clear();
        self.scratch.extend_from_slice(block);
        for filter in rest {
            filter.apply_block(&mut self.scratch, self.channels);
        }
        last.dry_run_block(&self.scratch, self.channels);
    }

    /// Return every filter to its initial state.
    pub fn reset(&mut self) {
        self.filters.iter_mut().for_each(|f| f.initialize());
    }
}

impl<T: Copy + Send + 'static> DynFilter<T> for FilterChain<T> {
    fn apply_block(&mut self, block: &mut [T], channels: usize) {
        for filter in &mut self.filters {
            filter.apply_block(block, channels);
        }
    }

    fn dry_run_block(&mut self, block: &[T], channels: usize) {
        let previous = std::mem::replace(&mut self.channels, channels);
        FilterChain::dry_run_block(self, block);
        self.channels = previous;
    }

    fn initialize(&mut self) {
        self.reset();
    }
}

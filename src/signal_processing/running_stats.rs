//! Windowed running minimum, maximum and range
//!
//! Uses Lemire's streaming min/max filter (Nordic Journal of Computing,
//! vol. 13, 2006): a per-channel deque of candidates, monotonic in value,
//! whose front is the extremum of the current window. A single min or max
//! costs at most two comparisons per sample amortized; the range shares one
//! comparison between its two deques and costs at most three.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

use super::filter::{Filter, Sample, State, SteadyState};

/// Ordering a deque keeps: the front is the best value in the window.
pub trait Extremum: Default + Clone + fmt::Debug + Send + 'static {
    /// True if `candidate` is strictly better than `than`.
    fn improves<T: PartialOrd>(candidate: &T, than: &T) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Min;

impl Extremum for Min {
    fn improves<T: PartialOrd>(candidate: &T, than: &T) -> bool {
        candidate < than
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Max;

impl Extremum for Max {
    fn improves<T: PartialOrd>(candidate: &T, than: &T) -> bool {
        candidate > than
    }
}

/// Candidates for the extremum of the last `window` samples of one channel.
///
/// Entries store the tick they were pushed at; their age is derived from a
/// shared clock, so aging every entry costs nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotonicDeque<T, E> {
    entries: VecDeque<(u64, T)>,
    clock: u64,
    _order: PhantomData<E>,
}

impl<T, E> Default for MonotonicDeque<T, E> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            clock: 0,
            _order: PhantomData,
        }
    }
}

impl<T: Copy + PartialOrd, E: Extremum> MonotonicDeque<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.clock = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extremum of the window, if any sample has been pushed.
    pub fn front(&self) -> Option<T> {
        self.entries.front().map(|&(_, v)| v)
    }

    fn back(&self) -> Option<T> {
        self.entries.back().map(|&(_, v)| v)
    }

    /// Entries front to back as `(age, value)`, age 1 being the newest.
    pub fn iter(&self) -> impl Iterator<Item = (u64, T)> + '_ {
        self.entries
            .iter()
            .map(move |&(tick, v)| (self.clock - tick + 1, v))
    }

    /// Drop the front entry once it is `window` samples old.
    fn evict(&mut self, window: usize) {
        if let Some(&(tick, _)) = self.entries.front() {
            if self.clock - tick + 1 >= window as u64 {
                self.entries.pop_front();
            }
        }
    }

    /// Pop back entries that do not strictly improve on `x`.
    fn pop_dominated(&mut self, x: T) {
        while let Some(&(_, back)) = self.entries.back() {
            if E::improves(&back, &x) {
                break;
            }
            self.entries.pop_back();
        }
    }

    fn append(&mut self, x: T) {
        self.clock += 1;
        self.entries.push_back((self.clock, x));
    }

    /// Advance the window by one sample.
    pub fn push(&mut self, x: T, window: usize) {
        self.evict(window);
        self.pop_dominated(x);
        self.append(x);
    }

    /// Make `x` the only candidate, as after a long constant run.
    pub fn settle(&mut self, x: T) {
        self.clear();
        self.append(x);
    }
}

/// Advance a min and a max deque over the same sample.
///
/// The newest entry of both deques is the previous sample, so one
/// comparison against it decides which deque keeps its tail: a rising
/// sample can only pop from the max deque and a falling one only from the
/// min deque.
pub fn push_min_max<T: Copy + PartialOrd>(
    min: &mut MonotonicDeque<T, Min>,
    max: &mut MonotonicDeque<T, Max>,
    x: T,
    window: usize,
) {
    min.evict(window);
    max.evict(window);

    match (min.back(), max.back()) {
        (Some(prev), Some(_)) => match x.partial_cmp(&prev) {
            Some(Ordering::Greater) => {
                max.entries.pop_back();
                max.pop_dominated(x);
            }
            Some(Ordering::Less) => {
                min.entries.pop_back();
                min.pop_dominated(x);
            }
            _ => {
                min.entries.pop_back();
                max.entries.pop_back();
                min.pop_dominated(x);
                max.pop_dominated(x);
            }
        },
        _ => {
            min.pop_dominated(x);
            max.pop_dominated(x);
        }
    }

    min.append(x);
    max.append(x);
}

/// Window length of a running extremum filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningStatsCoeffs {
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunningExtremumState<T, E> {
    deques: Vec<MonotonicDeque<T, E>>,
}

impl<T, E> Default for RunningExtremumState<T, E> {
    fn default() -> Self {
        Self { deques: Vec::new() }
    }
}

impl<T: Sample, E: Extremum> RunningExtremumState<T, E> {
    fn front(&self, c: usize) -> T {
        self.deques[c].front().unwrap_or_else(T::zero)
    }
}

impl<T: Sample, E: Extremum> State for RunningExtremumState<T, E> {
    type Sample = T;
    type Coeffs = RunningStatsCoeffs;

    const NATIVE_DRY_RUN: bool = true;

    fn setup(&mut self, _coeffs: &RunningStatsCoeffs, channels: usize) {
        if self.deques.len() != channels {
            self.deques = vec![MonotonicDeque::new(); channels];
        }
    }

    fn reset(&mut self) {
        self.deques.iter_mut().for_each(MonotonicDeque::clear);
    }

    fn apply(&mut self, coeffs: &RunningStatsCoeffs, frame: &mut [T]) {
        self.update(coeffs, frame);
        for (c, x) in frame.iter_mut().enumerate() {
            *x = self.front(c);
        }
    }

    fn update(&mut self, coeffs: &RunningStatsCoeffs, frame: &[T]) {
        if coeffs.length == 0 {
            return;
        }
        for (deque, &x) in self.deques.iter_mut().zip(frame) {
            deque.push(x, coeffs.length);
        }
    }
}

impl<T: Sample, E: Extremum> SteadyState for RunningExtremumState<T, E> {
    fn steady_state(&mut self, coeffs: &RunningStatsCoeffs, x_ss: &[T]) {
        if coeffs.length == 0 {
            return;
        }
        for (deque, &x) in self.deques.iter_mut().zip(x_ss) {
            deque.settle(x);
        }
    }
}

/// Max minus min over the window, per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningRangeState<T> {
    min: RunningExtremumState<T, Min>,
    max: RunningExtremumState<T, Max>,
}

impl<T> Default for RunningRangeState<T> {
    fn default() -> Self {
        Self {
            min: RunningExtremumState::default(),
            max: RunningExtremumState::default(),
        }
    }
}

impl<T: Sample> State for RunningRangeState<T> {
    type Sample = T;
    type Coeffs = RunningStatsCoeffs;

    const NATIVE_DRY_RUN: bool = true;

    fn setup(&mut self, coeffs: &RunningStatsCoeffs, channels: usize) {
        self.min.setup(coeffs, channels);
        self.max.setup(coeffs, channels);
    }

    fn reset(&mut self) {
        self.min.reset();
        self.max.reset();
    }

    fn apply(&mut self, coeffs: &RunningStatsCoeffs, frame: &mut [T]) {
        self.update(coeffs, frame);
        for (c, x) in frame.iter_mut().enumerate() {
            *x = self.max.front(c) - self.min.front(c);
        }
    }

    fn update(&mut self, coeffs: &RunningStatsCoeffs, frame: &[T]) {
        if coeffs.length == 0 {
            return;
        }
        let deques = self.min.deques.iter_mut().zip(self.max.deques.iter_mut());
        for ((min, max), &x) in deques.zip(frame) {
            push_min_max(min, max, x, coeffs.length);
        }
    }
}

impl<T: Sample> SteadyState for RunningRangeState<T> {
    fn steady_state(&mut self, coeffs: &RunningStatsCoeffs, x_ss: &[T]) {
        self.min.steady_state(coeffs, x_ss);
        self.max.steady_state(coeffs, x_ss);
    }
}

pub type RunningMin<T> = Filter<RunningExtremumState<T, Min>>;
pub type RunningMax<T> = Filter<RunningExtremumState<T, Max>>;
pub type RunningRange<T> = Filter<RunningRangeState<T>>;

impl<T: Sample, E: Extremum> Filter<RunningExtremumState<T, E>> {
    /// Extremum of the last `length` samples. A zero length outputs zero.
    pub fn new(length: usize) -> Self {
        Self::from_coeffs(RunningStatsCoeffs { length })
    }
}

impl<T: Sample> Filter<RunningRangeState<T>> {
    pub fn new(length: usize) -> Self {
        Self::from_coeffs(RunningStatsCoeffs { length })
    }
}

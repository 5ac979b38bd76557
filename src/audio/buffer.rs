use std::collections::VecDeque;

/// FIFO of decoded PCM frames awaiting playback
///
/// Frames are kept whole in arrival order; the front frame may be partially
/// consumed, tracked by a read offset. The total number of unread samples is
/// maintained incrementally so `len()` is O(1).
///
/// Invariant: when non-empty, `0 <= offset < front.len()`; when empty,
/// `offset == 0`.
///
/// Frames that are fully read, dropped or cleared are set aside rather than
/// freed, up to the queue's initial frame capacity, so the owner can release
/// them on another thread via [`take_spent`](Self::take_spent).
pub struct FrameQueue {
    frames: VecDeque<Vec<f32>>,
    spent: Vec<Vec<f32>>,
    offset: usize,
    queued: usize,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a queue with room for `frames` frames before reallocating
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(frames),
            spent: Vec::with_capacity(frames),
            offset: 0,
            queued: 0,
        }
    }

    /// Append a frame at the tail. Empty frames are ignored.
    pub fn push(&mut self, frame: Vec<f32>) {
        if frame.is_empty() {
            return;
        }
        self.queued += frame.len();
        self.frames.push_back(frame);
    }

    /// Copy samples from the front of the queue into `out`
    ///
    /// Crosses frame boundaries transparently and releases exhausted frames.
    /// Returns the number of samples written; positions past that are left
    /// untouched.
    pub fn read_into(&mut self, out: &mut [f32]) -> usize {
        let mut written = 0;
        while written < out.len() {
            let Some(first) = self.frames.front() else {
                break;
            };
            let to_copy = (first.len() - self.offset).min(out.len() - written);
            out[written..written + to_copy]
                .copy_from_slice(&first[self.offset..self.offset + to_copy]);
            written += to_copy;
            self.advance_front(to_copy);
        }
        written
    }

    /// Discard the oldest samples until at most `target` remain
    ///
    /// Returns the number of samples discarded.
    pub fn drop_oldest_to(&mut self, target: usize) -> usize {
        let mut dropped = 0;
        while self.queued > target {
            let Some(first) = self.frames.front() else {
                break;
            };
            let to_remove = (first.len() - self.offset).min(self.queued - target);
            dropped += to_remove;
            self.advance_front(to_remove);
        }
        dropped
    }

    fn advance_front(&mut self, count: usize) {
        self.offset += count;
        self.queued -= count;
        let exhausted = self
            .frames
            .front()
            .is_some_and(|first| self.offset == first.len());
        if exhausted {
            if let Some(frame) = self.frames.pop_front() {
                self.retire(frame);
            }
            self.offset = 0;
        }
    }

    fn retire(&mut self, frame: Vec<f32>) {
        // Never grow `spent`; past its capacity the frame is freed here
        if self.spent.len() < self.spent.capacity() {
            self.spent.push(frame);
        }
    }

    pub fn clear(&mut self) {
        while let Some(frame) = self.frames.pop_front() {
            self.retire(frame);
        }
        self.offset = 0;
        self.queued = 0;
    }

    /// Hand over frames that are no longer queued
    pub fn take_spent(&mut self) -> std::vec::Drain<'_, Vec<f32>> {
        self.spent.drain(..)
    }

    /// Unread samples across all queued frames
    pub fn len(&self) -> usize {
        self.queued
    }

    pub fn is_empty(&self) -> bool {
        self.queued == 0
    }

    /// Number of whole or partially read frames still queued
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Samples already consumed from the oldest queued frame
    pub fn offset_in_first_frame(&self) -> usize {
        self.offset
    }

    /// Length of the oldest queued frame, if any
    pub fn front_len(&self) -> Option<usize> {
        self.frames.front().map(Vec::len)
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

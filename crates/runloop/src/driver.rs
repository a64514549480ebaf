use std::time::{Duration, Instant};

use crate::timer::FrameTimer;

/// Handle for one registered per-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

/// Per-frame information handed to callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Zero-based frame counter.
    pub index: u64,
    /// Time since the first frame.
    pub since_start: Duration,
    /// Time since the previous frame (zero on the first).
    pub dt: Duration,
    pub at: Instant,
}

type Callback<S> = Box<dyn FnMut(&mut S, &FrameInfo)>;

/// Cooperative frame driver over an explicit state container `S`.
///
/// The host calls [`RenderLoop::frame`] once per display refresh; each live
/// callback runs in registration order against the same `&mut S`.
pub struct RenderLoop<S> {
    callbacks: Vec<(CallbackId, Callback<S>)>,
    next_id: u64,
    frame_index: u64,
    started_at: Option<Instant>,
    last_frame: Option<Instant>,
    timer: FrameTimer,
}

impl<S> Default for RenderLoop<S> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
            next_id: 0,
            frame_index: 0,
            started_at: None,
            last_frame: None,
            timer: FrameTimer::default(),
        }
    }
}

impl<S> RenderLoop<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback to run every frame until stopped.
    pub fn start<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut(&mut S, &FrameInfo) + 'static,
    {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        tracing::debug!(?id, live = self.callbacks.len(), "render loop callback started");
        id
    }

    /// Stop one callback. Unknown or already-stopped ids are ignored.
    pub fn stop(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        let stopped = self.callbacks.len() != before;
        if stopped {
            tracing::debug!(?id, live = self.callbacks.len(), "render loop callback stopped");
        }
        stopped
    }

    /// Stop every callback. Safe to call when nothing was started.
    pub fn stop_all(&mut self) {
        if !self.callbacks.is_empty() {
            tracing::debug!(count = self.callbacks.len(), "render loop stopped");
        }
        self.callbacks.clear();
    }

    pub fn is_running(&self) -> bool {
        !self.callbacks.is_empty()
    }

    pub fn live_callbacks(&self) -> usize {
        self.callbacks.len()
    }

    pub fn frames_run(&self) -> u64 {
        self.frame_index
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Run one frame. Returns `None` when no callback is registered.
    pub fn frame(&mut self, state: &mut S) -> Option<FrameInfo> {
        self.frame_at(state, Instant::now())
    }

    /// Run one frame stamped with `now`.
    pub fn frame_at(&mut self, state: &mut S, now: Instant) -> Option<FrameInfo> {
        if self.callbacks.is_empty() {
            return None;
        }
        let _span = tracing::trace_span!("frame", index = self.frame_index).entered();

        let started_at = *self.started_at.get_or_insert(now);
        let info = FrameInfo {
            index: self.frame_index,
            since_start: now.saturating_duration_since(started_at),
            dt: self
                .last_frame
                .map(|last| now.saturating_duration_since(last))
                .unwrap_or(Duration::ZERO),
            at: now,
        };

        let work_start = Instant::now();
        for (_, cb) in &mut self.callbacks {
            cb(state, &info);
        }
        self.timer.record(work_start.elapsed());

        self.last_frame = Some(now);
        self.frame_index += 1;
        Some(info)
    }

    /// Drive `n` frames back to back. Stops early if the loop has no callbacks.
    pub fn run_frames(&mut self, state: &mut S, n: u64) -> u64 {
        let mut ran = 0;
        for _ in 0..n {
            if self.frame(state).is_none() {
                break;
            }
            ran += 1;
        }
        ran
    }
}

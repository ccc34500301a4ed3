//! Single-slot hand-off between the capture and recording loops.
//!
//! The capture side overwrites the slot on every frame; the recording side
//! takes whatever is there when it polls. A frame that is overwritten before
//! it was taken is lost. That is the intended behavior: the recorder always
//! writes the newest frame and never builds a backlog.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::frame::Frame;

#[derive(Default)]
struct SlotState {
    frame: Frame,
    fresh: bool,
    dropped: u64,
}

/// Latest captured frame plus a flag telling whether it was already taken
#[derive(Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `frame`, replacing any frame not yet taken.
    pub fn publish(&self, frame: &Frame) {
        let mut state = self.lock();
        if state.fresh {
            state.dropped += 1;
        }
        state.frame.clone_from(frame);
        state.fresh = true;
    }

    /// Take the stored frame if it has not been taken yet.
    pub fn take_if_fresh(&self) -> Option<Frame> {
        let mut state = self.lock();
        if !state.fresh {
            return None;
        }
        state.fresh = false;
        Some(std::mem::take(&mut state.frame))
    }

    /// Whether a frame is waiting to be taken
    pub fn is_fresh(&self) -> bool {
        self.lock().fresh
    }

    /// Number of frames overwritten before they were taken
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    // Writers only assign whole fields, so a poisoned state is still consistent
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

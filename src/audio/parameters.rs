// Shared audio parameters - Lock-free values written by the UI, read by the audio callback

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Gain in [0.0, 1.0] stored as f32 bits
#[derive(Clone)]
pub struct SharedGain {
    inner: Arc<AtomicU32>,
}

impl SharedGain {
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(AtomicU32::new(value.clamp(0.0, 1.0).to_bits())),
        }
    }

    /// Set the gain (called from UI thread); out-of-range values are clamped
    pub fn set(&self, value: f32) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        self.inner.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Get the gain (called from audio thread)
    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for SharedGain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

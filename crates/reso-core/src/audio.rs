//! Audio level input: a 0..1 scalar sampled once per frame.
//!
//! Live capture is requested fire-and-forget by the front end. Until it
//! resolves, and forever if it fails, frames read a synthetic idle
//! oscillator instead. Nothing on this path returns an error.

use crate::constants::*;
use std::time::Duration;

pub trait LevelSource {
    fn level(&mut self, elapsed: Duration) -> f32;

    /// Release any underlying capture resources.
    fn release(&mut self) {}
}

/// Slow sine wobble used whenever no live input is available.
#[derive(Clone, Copy, Debug)]
pub struct IdleOscillator {
    pub center: f32,
    pub swing: f32,
    pub hz: f32,
}

impl Default for IdleOscillator {
    fn default() -> Self {
        Self {
            center: IDLE_LEVEL_CENTER,
            swing: IDLE_LEVEL_SWING,
            hz: IDLE_LEVEL_HZ,
        }
    }
}

impl IdleOscillator {
    pub fn sample(&self, elapsed: Duration) -> f32 {
        let phase = elapsed.as_secs_f32() * self.hz * std::f32::consts::TAU;
        (self.center + self.swing * phase.sin()).clamp(0.0, 1.0)
    }
}

impl LevelSource for IdleOscillator {
    fn level(&mut self, elapsed: Duration) -> f32 {
        self.sample(elapsed)
    }
}

/// Mean of byte frequency bins, mapped so a mean of 200 reads as full scale.
pub fn spectrum_level(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return SPECTRUM_LEVEL_FLOOR;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    let mean = sum as f32 / bins.len() as f32;
    (mean / SPECTRUM_FULL_SCALE).clamp(SPECTRUM_LEVEL_FLOOR, 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioStatus {
    Off,
    Pending,
    Live,
    Failed,
}

pub struct AudioInput {
    idle: IdleOscillator,
    live: Option<Box<dyn LevelSource>>,
    status: AudioStatus,
}

impl Default for AudioInput {
    fn default() -> Self {
        Self::new(IdleOscillator::default())
    }
}

impl AudioInput {
    pub fn new(idle: IdleOscillator) -> Self {
        Self {
            idle,
            live: None,
            status: AudioStatus::Off,
        }
    }

    pub fn status(&self) -> AudioStatus {
        self.status
    }

    /// Mark a capture request as in flight. Returns false if one is already
    /// pending or live.
    pub fn request(&mut self) -> bool {
        match self.status {
            AudioStatus::Pending | AudioStatus::Live => false,
            AudioStatus::Off | AudioStatus::Failed => {
                self.status = AudioStatus::Pending;
                true
            }
        }
    }

    /// Capture succeeded. A source arriving after `release` is dropped.
    pub fn resolve(&mut self, mut source: Box<dyn LevelSource>) -> bool {
        if self.status != AudioStatus::Pending {
            source.release();
            return false;
        }
        self.live = Some(source);
        self.status = AudioStatus::Live;
        log::info!("[audio] live input connected");
        true
    }

    pub fn fail(&mut self, reason: &str) {
        if self.status == AudioStatus::Pending {
            log::warn!("[audio] capture unavailable ({reason}); using idle level");
            self.status = AudioStatus::Failed;
        }
    }

    pub fn sample(&mut self, elapsed: Duration) -> f32 {
        match self.live.as_mut() {
            Some(source) => {
                let level = source.level(elapsed);
                if level.is_finite() {
                    level.clamp(0.0, 1.0)
                } else {
                    self.idle.sample(elapsed)
                }
            }
            None => self.idle.sample(elapsed),
        }
    }

    /// Stop any live capture. Safe whether or not capture ever completed.
    pub fn release(&mut self) {
        if let Some(mut source) = self.live.take() {
            source.release();
        }
        self.status = AudioStatus::Off;
    }
}

/// Level spikes above a threshold, at most once per cooldown.
#[derive(Clone, Debug)]
pub struct PeakDetector {
    pub threshold: f32,
    pub cooldown: Duration,
    last_peak: Option<Duration>,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self {
            threshold: AUDIO_PEAK_LEVEL,
            cooldown: AUDIO_PEAK_COOLDOWN,
            last_peak: None,
        }
    }
}

impl PeakDetector {
    pub fn update(&mut self, level: f32, now: Duration) -> bool {
        if level <= self.threshold {
            return false;
        }
        if let Some(last) = self.last_peak {
            if now.saturating_sub(last) < self.cooldown {
                return false;
            }
        }
        self.last_peak = Some(now);
        true
    }
}

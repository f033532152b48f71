//! Shader backdrop uniforms driven by resonance parameters and audio level.

use crate::constants::*;
use crate::metrics::ResonanceParameters;

/// Uniform block layout shared with the backdrop shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub time: f32,
    pub intensity: f32,
    pub spread: f32,
    pub noise: f32,
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Editing: graph gestures enabled, slow backdrop.
    #[default]
    Stop,
    /// Listening: audio capture on, node gestures disabled.
    Play,
}

/// Per-60 Hz-frame smoothing rate turned into a rate for `dt`.
#[inline]
fn smoothing(rate_per_frame: f32, dt_sec: f32) -> f32 {
    1.0 - (1.0 - rate_per_frame).powf(dt_sec * REFERENCE_FPS)
}

#[derive(Clone, Debug)]
pub struct UniformDriver {
    uniforms: ShaderUniforms,
}

impl Default for UniformDriver {
    fn default() -> Self {
        Self {
            uniforms: ShaderUniforms {
                intensity: 0.2,
                spread: 0.2,
                noise: 0.2,
                resolution: [1.0, 1.0],
                ..ShaderUniforms::default()
            },
        }
    }
}

impl UniformDriver {
    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.uniforms.resolution = [width.max(1.0), height.max(1.0)];
    }

    pub fn update(&mut self, params: &ResonanceParameters, level: f32, dt_sec: f32, mode: Mode) -> &ShaderUniforms {
        let dt = if dt_sec.is_finite() {
            dt_sec.clamp(0.0, MAX_STEP_SEC)
        } else {
            0.0
        };
        let u = &mut self.uniforms;
        let intensity_target = (params.tension + level * UNIFORM_LEVEL_TO_INTENSITY).clamp(0.1, 1.0);
        let spread_target = (params.spread + level * UNIFORM_LEVEL_TO_SPREAD).clamp(0.05, 1.0);
        let rate = match mode {
            Mode::Play => UNIFORM_TIME_RATE_PLAY,
            Mode::Stop => UNIFORM_TIME_RATE_STOP,
        };
        u.time += dt * rate;
        u.intensity += (intensity_target - u.intensity) * smoothing(UNIFORM_SMOOTH_INTENSITY, dt);
        u.spread += (spread_target - u.spread) * smoothing(UNIFORM_SMOOTH_SPREAD, dt);
        u.noise += (level.clamp(0.0, 1.0) - u.noise) * smoothing(UNIFORM_SMOOTH_NOISE, dt);
        &self.uniforms
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniforms)
    }
}

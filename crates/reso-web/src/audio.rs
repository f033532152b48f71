use reso_core::{spectrum_level, LevelSource};
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

const ANALYSER_FFT_SIZE: u32 = 256;

fn js_err(label: &str, e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{label}: {e:?}")
}

/// Live microphone level read from an `AnalyserNode`.
pub struct MicLevel {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    stream: web::MediaStream,
    bins: Vec<u8>,
}

impl LevelSource for MicLevel {
    fn level(&mut self, _elapsed: Duration) -> f32 {
        self.analyser.get_byte_frequency_data(&mut self.bins);
        spectrum_level(&self.bins)
    }

    fn release(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
                track.stop();
            }
        }
        if let Err(e) = self.ctx.close() {
            log::warn!("[audio] AudioContext close error: {:?}", e);
        }
    }
}

/// Ask for the microphone and wire it into an analyser.
pub async fn request_microphone() -> anyhow::Result<MicLevel> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|e| js_err("mediaDevices unavailable", e))?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| js_err("getUserMedia", e))?;
    let stream: web::MediaStream = JsFuture::from(promise)
        .await
        .map_err(|e| js_err("microphone denied", e))?
        .dyn_into()
        .map_err(|e| js_err("not a MediaStream", e))?;

    let ctx = web::AudioContext::new().map_err(|e| js_err("AudioContext", e))?;
    let analyser = ctx.create_analyser().map_err(|e| js_err("AnalyserNode", e))?;
    analyser.set_fft_size(ANALYSER_FFT_SIZE);
    let source = ctx
        .create_media_stream_source(&stream)
        .map_err(|e| js_err("MediaStreamSource", e))?;
    source
        .connect_with_audio_node(&analyser)
        .map_err(|e| js_err("connect analyser", e))?;
    let bins = vec![0u8; analyser.frequency_bin_count() as usize];
    log::info!("[audio] microphone live ({} bins)", bins.len());
    Ok(MicLevel {
        ctx,
        analyser,
        stream,
        bins,
    })
}

#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Design {
    dt: f64,
    freq_hz: f64,
    gain: f64,
    quality: f64,
    input: Vec<f64>,
}

fuzz_target!(|d: Design| {
    // Invalid designs are rejected; valid ones filter without panicking.
    if let Ok(mut f) = teleop_core::SecondOrderLowPass::configure(d.dt, d.freq_hz, d.gain, d.quality) {
        for x in d.input.into_iter().take(256) {
            let _ = f.filter_val(x);
        }
    }
});

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary TOML must either fail to parse or yield a config whose
    // validation returns normally.
    if let Ok(cfg) = teleop_config::load_toml(data) {
        let _ = cfg.validate();
    }
});

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = fader_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // Anything the file validator accepts must also pass the builder checks.
            let runtime = fader_core::FaderCfg::from(&cfg);
            assert!(
                fader_core::builder::validate(&runtime).is_ok(),
                "validated config rejected by builder: {cfg:?}"
            );
        }
    }
});

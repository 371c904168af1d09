#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = sweeper_config::load_toml(data) {
        let _ = cfg.validate();
    }
    // Unit parsing is shared by the CSV loader.
    let _ = data.parse::<sweeper_config::Unit>();
});

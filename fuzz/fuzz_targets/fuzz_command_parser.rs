#![no_main]
use libfuzzer_sys::fuzz_target;

use fader_core::{Command, Reply};

fuzz_target!(|data: &str| {
    let Ok(cmd) = Command::parse(data) else {
        return;
    };
    // Level replies must render back into a line the parser accepts.
    if let Command::Level(n) = cmd {
        let line = Reply::Level(n).to_string();
        assert_eq!(Command::parse(&line), Ok(Command::Level(n)));
    }
});

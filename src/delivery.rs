use crate::error::Result;
use crate::parser::NormalizedScript;
use crate::session::{LaunchMode, Tube};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use std::thread;
use std::time::Duration;

pub fn encode_payload(js: &str) -> String {
    STANDARD.encode(js.as_bytes())
}

/// The whole payload as a single line.
pub fn deliver_local(tube: &mut Tube, script: &NormalizedScript) -> Result<()> {
    info!(
        "sending {} bytes of js ({} top-level lines)",
        script.text.len(),
        script.top_level_lines()
    );
    tube.send_line(&script.text)
}

/// Length of the base64 payload on one line, a pause, then the payload itself.
pub fn deliver_remote(tube: &mut Tube, script: &NormalizedScript, delay: Duration) -> Result<()> {
    let encoded = encode_payload(&script.text);
    info!("sending {} bytes of base64 js", encoded.len());
    tube.send_line(encoded.len().to_string())?;
    thread::sleep(delay);
    tube.send_line(&encoded)
}

pub fn deliver(
    tube: &mut Tube,
    mode: LaunchMode,
    script: &NormalizedScript,
    delay: Duration,
) -> Result<()> {
    match mode {
        LaunchMode::Remote => deliver_remote(tube, script, delay),
        LaunchMode::Local | LaunchMode::Gdb => deliver_local(tube, script),
    }
}

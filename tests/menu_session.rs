// tests/menu_session.rs
// Drives the heap menu and payload delivery against scripted target output

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use v8_harness::config::Profile;
use v8_harness::delivery::{deliver, deliver_remote, encode_payload};
use v8_harness::menu::{unpack_le, Menu};
use v8_harness::parser::normalize_source;
use v8_harness::session::{LaunchMode, Tube};
use v8_harness::HarnessError;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn scripted(output: &[u8]) -> (Tube, Capture) {
    let capture = Capture::default();
    let tube = Tube::from_parts(
        Cursor::new(output.to_vec()),
        capture.clone(),
        Duration::from_secs(1),
    );
    (tube, capture)
}

fn prompted_profile() -> Profile {
    Profile {
        menu_prompt: "> ".to_string(),
        value_prompt: ": ".to_string(),
        ..Profile::default()
    }
}

#[cfg(test)]
mod menu_tests {
    use super::*;

    #[test]
    fn test_create_edit_delete() {
        let (mut tube, sent) = scripted(b"> size: > index: > ");
        let profile = prompted_profile();
        let mut menu = Menu::new(&mut tube, &profile);

        menu.create(32, "AAAA").expect("create failed");
        menu.edit(0, b"BBBB").expect("edit failed");
        menu.delete(0).expect("delete failed");

        assert_eq!(sent.text(), "32\nAAAA\n0\nBBBB\n0\n");
    }

    #[test]
    fn test_view_returns_leak() {
        let (mut tube, sent) = scripted(b"> value: \xef\xbe\xad\xde\xff\x7f\n");
        let profile = prompted_profile();
        let mut menu = Menu::new(&mut tube, &profile);

        let line = menu.view(3).expect("view failed");
        assert_eq!(sent.text(), "3\n");

        let leak = unpack_le(line.strip_suffix(b"\n").unwrap());
        assert_eq!(leak, 0x7fff_dead_beef);
    }

    #[test]
    fn test_default_prompts_do_not_wait() {
        let (mut tube, sent) = scripted(b"");
        let profile = Profile::default();
        let mut menu = Menu::new(&mut tube, &profile);

        menu.create(16, "x").expect("empty prompts return immediately");
        assert_eq!(sent.text(), "16\nx\n");
    }

    #[test]
    fn test_target_gone_mid_menu() {
        let (mut tube, _sent) = scripted(b"> ");
        let profile = prompted_profile();
        let mut menu = Menu::new(&mut tube, &profile);

        let err = menu.create(8, "x").unwrap_err();
        assert!(matches!(err, HarnessError::Closed));
    }
}

#[cfg(test)]
mod delivery_tests {
    use super::*;

    #[test]
    fn test_local_delivery_is_one_send() {
        let script = normalize_source("let a = 1\nfunction f() {\nreturn a\n}\n").unwrap();
        let (mut tube, sent) = scripted(b"");

        deliver(&mut tube, LaunchMode::Local, &script, Duration::ZERO).unwrap();
        assert_eq!(sent.text(), "let a = 1;\nfunction f() {return a;};\n\n");
    }

    #[test]
    fn test_remote_delivery_length_then_base64() {
        let script = normalize_source("print(1)\n").unwrap();
        let (mut tube, sent) = scripted(b"");

        deliver_remote(&mut tube, &script, Duration::from_millis(10)).unwrap();

        let encoded = encode_payload("print(1);\n");
        let expected = format!("{}\n{}\n", encoded.len(), encoded);
        assert_eq!(sent.text(), expected);
    }
}

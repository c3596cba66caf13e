use super::Tube;
use crate::config::Profile;
use crate::error::{HarnessError, Result};
use log::{info, warn};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

/// How the target is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Local,
    Gdb,
    Remote,
}

pub fn start(mode: LaunchMode, profile: &Profile) -> Result<Tube> {
    match mode {
        LaunchMode::Local => launch_local(profile),
        LaunchMode::Gdb => launch_gdb(profile),
        LaunchMode::Remote => connect_remote(profile),
    }
}

fn required_binary(profile: &Profile) -> Result<&Path> {
    profile
        .binary
        .as_deref()
        .ok_or(HarnessError::MissingBinary)
}

fn spawn_piped(cmd: &mut Command, timeout: Duration) -> Result<Tube> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| HarnessError::Launch {
            program: program.clone(),
            source,
        })?;

    let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        let _ = child.kill();
        return Err(HarnessError::Launch {
            program,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "stdio not captured"),
        });
    };

    info!("started {} (pid {})", program, child.id());
    Ok(Tube::from_parts(stdout, stdin, timeout).with_child(child))
}

/// Run the binary directly with its stdio piped to us.
pub fn launch_local(profile: &Profile) -> Result<Tube> {
    let binary = required_binary(profile)?;
    let mut cmd = Command::new(binary);
    cmd.args(&profile.binary_args);
    spawn_piped(&mut cmd, profile.timeout())
}

/// Host the binary under gdbserver and open gdb on it in a new terminal.
pub fn launch_gdb(profile: &Profile) -> Result<Tube> {
    let binary = required_binary(profile)?;
    let listen = format!("localhost:{}", profile.gdb_port);

    let mut server = Command::new("gdbserver");
    server
        .arg(&listen)
        .arg(binary)
        .args(&profile.binary_args)
        .stderr(Stdio::piped());
    let mut tube = spawn_piped(&mut server, profile.timeout())?;
    wait_for_listener(&mut tube, profile.timeout());

    let mut script = tempfile::Builder::new()
        .prefix("v8-harness-")
        .suffix(".gdb")
        .tempfile()?;
    script.write_all(gdb_script(profile, binary).as_bytes())?;
    script.flush()?;

    let mut argv = terminal_argv(&profile.terminal)?;
    argv.extend([
        "gdb".to_string(),
        "-q".to_string(),
        "-x".to_string(),
        script.path().to_string_lossy().into_owned(),
    ]);
    info!("opening debugger: {}", argv.join(" "));

    let helper = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| HarnessError::Launch {
            program: argv[0].clone(),
            source,
        })?;
    tube.attach_helper(helper);
    tube.keep_file(script);
    Ok(tube)
}

/// gdbserver announces its port on stderr; block until it does, then keep echoing.
fn wait_for_listener(tube: &mut Tube, timeout: Duration) {
    let Some(stderr) = tube.take_child_stderr() else {
        return;
    };

    let (tx, rx) = channel();
    thread::spawn(move || {
        let mut announced = false;
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            eprintln!("{}", line);
            if !announced && line.contains("Listening on port") {
                announced = true;
                let _ = tx.send(());
            }
        }
    });

    if rx.recv_timeout(timeout).is_err() {
        warn!("gdbserver did not report a listening port within {:?}", timeout);
    }
}

/// Session script: attach to gdbserver, then the profile's own commands.
pub fn gdb_script(profile: &Profile, binary: &Path) -> String {
    let mut script = format!(
        "file {}\ntarget remote localhost:{}\n",
        binary.display(),
        profile.gdb_port
    );
    for line in profile.gdb_script.lines() {
        let line = line.trim();
        if !line.is_empty() {
            script.push_str(line);
            script.push('\n');
        }
    }
    script
}

pub fn terminal_argv(terminal: &str) -> Result<Vec<String>> {
    match shlex::split(terminal) {
        Some(argv) if !argv.is_empty() => Ok(argv),
        _ => Err(HarnessError::Terminal(terminal.to_string())),
    }
}

pub fn connect_remote(profile: &Profile) -> Result<Tube> {
    let addr = profile.remote_addr();
    let resolved = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("cannot resolve {}", addr)))?;

    let stream = TcpStream::connect_timeout(&resolved, profile.timeout())?;
    stream.set_nodelay(true)?;
    info!("connected to {} ({})", addr, resolved);

    let reader = stream.try_clone()?;
    Ok(Tube::from_parts(reader, stream, profile.timeout()))
}

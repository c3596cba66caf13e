use crate::error::{HarnessError, Result};
use log::{debug, info, warn};
use std::io::{self, BufRead, Read, Write};
use std::process::{Child, ChildStderr};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

enum Chunk {
    Data(Vec<u8>),
    Eof,
    Failed(io::Error),
}

/// Line-oriented I/O to the target with a fixed read timeout.
///
/// Reads happen on a background thread so a blocked pipe or socket can be
/// abandoned after the timeout instead of hanging the run.
pub struct Tube {
    rx: Receiver<Chunk>,
    writer: Box<dyn Write + Send>,
    buffer: Vec<u8>,
    timeout: Duration,
    eof: bool,
    child: Option<Child>,
    helpers: Vec<Child>,
    _scratch: Vec<NamedTempFile>,
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> Receiver<Chunk> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    let _ = tx.send(Chunk::Eof);
                    break;
                }
                Ok(n) => {
                    if tx.send(Chunk::Data(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let _ = tx.send(Chunk::Failed(e));
                    break;
                }
            }
        }
    });
    rx
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

impl Tube {
    pub fn from_parts<R, W>(reader: R, writer: W, timeout: Duration) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self {
            rx: spawn_reader(reader),
            writer: Box::new(writer),
            buffer: Vec::new(),
            timeout,
            eof: false,
            child: None,
            helpers: Vec::new(),
            _scratch: Vec::new(),
        }
    }

    /// Tie the target process to this tube; it is killed when the tube drops.
    pub fn with_child(mut self, child: Child) -> Self {
        self.child = Some(child);
        self
    }

    pub fn take_child_stderr(&mut self) -> Option<ChildStderr> {
        self.child.as_mut()?.stderr.take()
    }

    /// Keep a side process (e.g. the gdb window) alive as long as the tube.
    pub fn attach_helper(&mut self, helper: Child) {
        self.helpers.push(helper);
    }

    /// Keep a scratch file on disk as long as the tube.
    pub fn keep_file(&mut self, file: NamedTempFile) {
        self._scratch.push(file);
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Receive up to and including `delim`. An empty `delim` returns at once.
    pub fn recv_until(&mut self, delim: &[u8]) -> Result<Vec<u8>> {
        if delim.is_empty() {
            return Ok(Vec::new());
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(pos) = find(&self.buffer, delim) {
                let data: Vec<u8> = self.buffer.drain(..pos + delim.len()).collect();
                debug!("recv {:?}", String::from_utf8_lossy(&data));
                return Ok(data);
            }
            self.fill(deadline, delim)?;
        }
    }

    pub fn recv_line(&mut self) -> Result<Vec<u8>> {
        self.recv_until(b"\n")
    }

    fn fill(&mut self, deadline: Instant, waiting_for: &[u8]) -> Result<()> {
        if self.eof {
            return Err(HarnessError::Closed);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(remaining) {
            Ok(Chunk::Data(bytes)) => {
                self.buffer.extend_from_slice(&bytes);
                Ok(())
            }
            Ok(Chunk::Eof) | Err(RecvTimeoutError::Disconnected) => {
                self.eof = true;
                Err(HarnessError::Closed)
            }
            Ok(Chunk::Failed(e)) => {
                self.eof = true;
                Err(e.into())
            }
            Err(RecvTimeoutError::Timeout) => Err(HarnessError::Timeout {
                waiting_for: String::from_utf8_lossy(waiting_for).into_owned(),
                after: self.timeout,
            }),
        }
    }

    pub fn send_line(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        debug!("send {:?}", String::from_utf8_lossy(data));
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Wait for `delim`, then send `data` as a line. Returns what was received.
    pub fn send_line_after(&mut self, delim: &[u8], data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let received = self.recv_until(delim)?;
        self.send_line(data)?;
        Ok(received)
    }

    /// Hand the target over to the terminal until it closes.
    pub fn interactive(mut self) -> Result<()> {
        info!("switching to interactive mode");

        let mut stdout = io::stdout();
        stdout.write_all(&self.buffer)?;
        stdout.flush()?;
        self.buffer.clear();

        if self.eof {
            return Ok(());
        }

        let mut writer = std::mem::replace(&mut self.writer, Box::new(io::sink()));
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if writeln!(writer, "{}", line).and_then(|_| writer.flush()).is_err() {
                    break;
                }
            }
        });

        loop {
            match self.rx.recv() {
                Ok(Chunk::Data(bytes)) => {
                    stdout.write_all(&bytes)?;
                    stdout.flush()?;
                }
                Ok(Chunk::Eof) | Err(_) => break,
                Ok(Chunk::Failed(e)) => return Err(e.into()),
            }
        }

        self.eof = true;
        info!("target closed the connection");
        Ok(())
    }
}

impl Drop for Tube {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if let Err(e) = child.kill() {
                if e.kind() != io::ErrorKind::InvalidInput {
                    warn!("failed to stop target: {}", e);
                }
            }
            let _ = child.wait();
        }
        for helper in &mut self.helpers {
            let _ = helper.try_wait();
        }
    }
}

#![allow(dead_code)]

use anyhow::Result;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Path of the procwatch binary built for this test run
pub fn procwatch_bin() -> &'static str {
    env!("CARGO_BIN_EXE_procwatch")
}

#[derive(Debug)]
pub struct TestOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl TestOutput {
    pub fn was_successful(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    pub fn contains_output(&self, text: &str) -> bool {
        self.stdout.contains(text) || self.stderr.contains(text)
    }
}

/// Runs procwatch, lets it poll for a while, then interrupts it
pub struct MonitorRunner {
    shutdown_timeout: Duration,
}

impl MonitorRunner {
    pub fn new(shutdown_timeout_seconds: u64) -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(shutdown_timeout_seconds),
        }
    }

    pub fn spawn(&self, args: &[&str]) -> Result<Child> {
        Ok(Command::new(procwatch_bin())
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?)
    }

    /// Run with `args`, call `during` while the monitor runs, then send SIGINT
    #[cfg(unix)]
    pub fn run_with_interrupt<F>(&self, args: &[&str], settle: Duration, during: F) -> Result<TestOutput>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut child = self.spawn(args)?;
        let pipes = (drain(child.stdout.take()), drain(child.stderr.take()));

        thread::sleep(settle);
        let during_result = during();

        send_signal(child.id(), libc::SIGINT)?;
        let output = self.wait_with_timeout(child, pipes)?;
        during_result?;
        Ok(output)
    }

    /// Wait for exit; both pipes are drained on their own threads so a chatty
    /// child never blocks on write
    fn wait_with_timeout(
        &self,
        mut child: Child,
        (stdout, stderr): (JoinHandle<String>, JoinHandle<String>),
    ) -> Result<TestOutput> {
        let deadline = Instant::now() + self.shutdown_timeout;
        let mut timed_out = false;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    timed_out = true;
                    let _ = child.kill();
                    break child.wait()?;
                }
                None => thread::sleep(Duration::from_millis(50)),
            }
        };

        Ok(TestOutput {
            exit_code: status.code(),
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
            timed_out,
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).to_string()
    })
}

#[cfg(unix)]
pub fn send_signal(pid: u32, signal: libc::c_int) -> Result<()> {
    let result = unsafe { libc::kill(pid as libc::pid_t, signal) };
    if result != 0 {
        anyhow::bail!("Failed to send signal {} to PID {}", signal, pid);
    }
    Ok(())
}

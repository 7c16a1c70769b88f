//! Process execution seam
//!
//! Every command reaches the system through a [`ProcessRunner`]. The
//! default [`SystemRunner`] spawns the program directly with discrete
//! arguments; no shell is ever involved, so tokens are never re-split or
//! interpreted. Standard output and standard error are captured through a
//! single pipe, in the order the child wrote them. Tests substitute a
//! recording runner.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Result of running a program to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Standard output and standard error, interleaved as written
    pub output: Vec<u8>,
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    /// Whether the program exited successfully
    pub success: bool,
}

impl RunOutput {
    pub fn succeeded(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            code: Some(0),
            success: true,
        }
    }

    pub fn failed(code: i32, output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            code: Some(code),
            success: false,
        }
    }
}

/// Runs an external program and collects its output
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`, feeding `stdin` if given
    ///
    /// An `Err` means the program could not be run at all; a non-zero exit
    /// is reported through [`RunOutput::success`].
    fn run(&self, program: &Path, args: &[String], stdin: Option<&[u8]>) -> io::Result<RunOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, program: &Path, args: &[String], stdin: Option<&[u8]>) -> io::Result<RunOutput> {
        (**self).run(program, args, stdin)
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for std::sync::Arc<R> {
    fn run(&self, program: &Path, args: &[String], stdin: Option<&[u8]>) -> io::Result<RunOutput> {
        (**self).run(program, args, stdin)
    }
}

/// Runs programs with `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String], stdin: Option<&[u8]>) -> io::Result<RunOutput> {
        // stdout and stderr share one pipe so their writes stay interleaved
        let (mut reader, writer) = io::pipe()?;
        let mut child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(if stdin.is_some() {
                    Stdio::piped()
                } else {
                    Stdio::null()
                })
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn()?
        };
        // the write ends held by `command` are closed here, so the reader
        // sees EOF once the child exits

        let pipe = child.stdin.take();
        let mut output = Vec::new();
        let read = thread::scope(|s| {
            let writer = match (stdin, pipe) {
                (Some(input), Some(mut pipe)) => Some(s.spawn(move || pipe.write_all(input))),
                _ => None,
            };
            let read = reader.read_to_end(&mut output);
            if let Some(writer) = writer {
                match writer.join() {
                    Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => {
                        log::warn!("failed to write stdin of {}: {}", program.display(), e);
                    }
                    _ => {}
                }
            }
            read
        });
        let status = child.wait()?;
        read?;

        Ok(RunOutput {
            output,
            code: status.code(),
            success: status.success(),
        })
    }
}

//! External process execution.
//!
//! Tools run with stdout streamed to the log and stderr echoed as it arrives,
//! keeping the last lines of stderr for the error message. A non-zero exit
//! becomes [`Error::ToolFailed`] carrying the tool's exit code.

use crate::bundler::{
    builder::tool_detection::locate_tool,
    error::{Error, Result},
    settings::ToolCommand,
};
use std::{collections::VecDeque, path::Path, process::Stdio, time::Duration};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    process::Command,
};

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Runs `tool` followed by `args` in `cwd`, failing on non-zero exit.
pub async fn run_tool(
    tool: &ToolCommand,
    args: &[String],
    cwd: &Path,
    timeout: Duration,
) -> Result<()> {
    let program = locate_tool(tool.program()).await?;
    let command_line = render_command_line(tool, args);
    log::info!("Running: {}", command_line);

    let mut child = Command::new(&program)
        .args(tool.args())
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            Error::GenericError(format!("Failed to execute `{}`: {}", command_line, e))
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let streams = async {
        // Both streams must drain before the exit status is meaningful
        let (_, tail) = tokio::join!(
            async {
                if let Some(stdout) = stdout {
                    let mut reader = BufReader::new(stdout);
                    let mut buf = Vec::new();
                    while let Some(line) = next_line(&mut reader, &mut buf).await {
                        log::info!("  {}", line);
                    }
                }
            },
            async {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                if let Some(stderr) = stderr {
                    let mut reader = BufReader::new(stderr);
                    let mut buf = Vec::new();
                    while let Some(line) = next_line(&mut reader, &mut buf).await {
                        eprintln!("{}", line);
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
                tail
            }
        );
        let status = child.wait().await;
        (status, tail)
    };

    let (status, tail) = match tokio::time::timeout(timeout, streams).await {
        Ok(result) => result,
        Err(_elapsed) => {
            // kill_on_drop terminates the child when it goes out of scope
            log::warn!(
                "`{}` exceeded {}s, terminating",
                command_line,
                timeout.as_secs()
            );
            return Err(Error::ToolTimeout {
                command: command_line,
                timeout,
            });
        }
    };

    let status = status.map_err(|e| {
        Error::GenericError(format!("Failed to wait for `{}`: {}", command_line, e))
    })?;

    if status.success() {
        log::debug!("`{}` finished successfully", command_line);
        Ok(())
    } else {
        Err(Error::ToolFailed {
            command: command_line,
            code: status.code(),
            stderr_tail: tail.into_iter().collect(),
        })
    }
}

/// Reads one line as lossy UTF-8, without the trailing newline.
///
/// Returns `None` at end of stream or on a read error. Tools may write bytes
/// that are not UTF-8; the stream must keep draining or the child blocks or
/// dies on a closed pipe.
async fn next_line<R: AsyncBufRead + Unpin>(reader: &mut R, buf: &mut Vec<u8>) -> Option<String> {
    buf.clear();
    match reader.read_until(b'\n', buf).await {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            Some(String::from_utf8_lossy(line).into_owned())
        }
    }
}

fn render_command_line(tool: &ToolCommand, args: &[String]) -> String {
    let mut line = tool.to_string();
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

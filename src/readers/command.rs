// External-process runner with a bounded wait

use super::ReadError;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Kills the child and, on unix, every process in its group, then reaps it.
/// The group is signalled before the wait so its id cannot have been reused.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let _ = Command::new("kill")
            .args(["-s", "KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Runs `program args...` and returns its stdout. The child is killed if it has not
/// exited within `timeout`. Non-zero exit and non-UTF-8 output are errors.
///
/// On unix the child leads its own process group, so a timeout also takes down
/// anything it forked (e.g. both sides of a shell pipeline) and stdout reaches EOF.
pub fn run_command(program: &str, args: &[&str], timeout: Duration) -> Result<String, ReadError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut command, 0);
    let mut child = command
        .spawn()
        .map_err(|source| ReadError::Spawn {
            program: program.to_string(),
            source,
        })?;

    // Drain stdout on a helper thread so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take();
    let reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout {
            let _ = out.read_to_end(&mut buf);
        }
        buf
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= timeout => {
                terminate(&mut child);
                let _ = reader.join();
                return Err(ReadError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                terminate(&mut child);
                let _ = reader.join();
                return Err(ReadError::CommandFailed {
                    program: program.to_string(),
                    status: e.to_string(),
                });
            }
        }
    };

    let out = reader.join().unwrap_or_default();
    if !status.success() {
        return Err(ReadError::CommandFailed {
            program: program.to_string(),
            status: status.to_string(),
        });
    }
    String::from_utf8(out).map_err(|e| ReadError::Parse(format!("{program} output: {e}")))
}

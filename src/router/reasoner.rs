use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// The pluggable reasoning collaborator. `None` means the collaborator could
/// not produce a result in time; the caller substitutes the deterministic
/// fallback so a pass never blocks on it.
pub trait Reasoner {
    fn reason(&self, description: &str, required_outcome: &str) -> Option<String>;
}

/// Always defers to the fallback summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackReasoner;

impl Reasoner for FallbackReasoner {
    fn reason(&self, _description: &str, _required_outcome: &str) -> Option<String> {
        None
    }
}

/// Deterministic structured summary used whenever no reasoner answer is
/// available.
pub fn fallback_result(description: &str, required_outcome: &str) -> String {
    format!(
        "**Task Analysis** (automated)\n\n\
        **Input**: {}\n\n\
        **Objective**: {}\n\n\
        **Status**: Task analyzed and filed. Full reasoning requires an external \
        reasoner command. Re-run with one configured for complete processing.",
        truncate(description, 300),
        truncate(required_outcome, 300),
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Invokes an external CLI for reasoning with a bounded wait. Spawn failures,
/// non-zero exits, empty output, and timeouts all yield `None`.
#[derive(Debug, Clone)]
pub struct CommandReasoner {
    pub binary: String,
    pub timeout: Duration,
}

impl CommandReasoner {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn render_prompt(description: &str, required_outcome: &str) -> String {
        format!(
            "You are processing a task in a document vault.\n\n\
            ## Task Description\n{description}\n\n\
            ## Required Outcome\n{required_outcome}\n\n\
            Produce a concrete, actionable result that satisfies the required \
            outcome. Be specific and thorough. Output ONLY the result text, no \
            preamble."
        )
    }
}

impl Reasoner for CommandReasoner {
    fn reason(&self, description: &str, required_outcome: &str) -> Option<String> {
        let prompt = Self::render_prompt(description, required_outcome);

        let mut child = Command::new(&self.binary)
            .args(["--print", "-p", &prompt])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;

        let stdout = child.stdout.take()?;
        let reader = thread::spawn(move || {
            let mut buf = String::new();
            let mut stdout = stdout;
            let _ = stdout.read_to_string(&mut buf);
            buf
        });

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = reader.join();
                        return None;
                    }
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => return None,
            }
        };

        let output = reader.join().unwrap_or_default();
        let trimmed = output.trim();
        if status.success() && !trimmed.is_empty() {
            Some(trimmed.to_string())
        } else {
            None
        }
    }
}

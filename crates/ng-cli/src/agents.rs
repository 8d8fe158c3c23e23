//! Reply producers for model turns, and the one place that picks them by kind.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use anyhow::{Result, bail};
use ng_core::{AgentKind, ReplyAgent, ReplyError};
use ng_store::{AgentConfig, Config};

/// Runs an external program per turn: context on stdin, prompt as the last
/// argument, reply on stdout.
///
/// The command line is split on whitespace with no quoting; arguments that
/// contain spaces are passed separately as `extra_args`.
pub struct CommandAgent {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandAgent {
    pub fn new(name: &str, command_line: &str, extra_args: &[String]) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            name: name.to_string(),
            program,
            args: parts.chain(extra_args.iter().cloned()).collect(),
        })
    }
}

impl ReplyAgent for CommandAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_reply(&self, prompt: &str, context: &str) -> Result<String, ReplyError> {
        tracing::debug!("running reply command for {}: {}", self.name, self.program);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(prompt)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start {}: {e}", self.program))?;

        // Programs that ignore stdin may exit before the context is written.
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(context.as_bytes())
            && e.kind() != ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Stand-in used when no reply command is configured. Answers with a
/// well-formed acknowledgment so the conversation flow can be exercised offline.
pub struct OfflineAgent {
    name: String,
}

impl OfflineAgent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl ReplyAgent for OfflineAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_reply(&self, _prompt: &str, _context: &str) -> Result<String, ReplyError> {
        Ok(format!(
            "🧠: {}\n💡: acknowledge\n📝: offline, no reply command configured",
            self.name
        ))
    }
}

fn from_config(agent: &AgentConfig) -> Box<dyn ReplyAgent> {
    let command = agent
        .command
        .as_deref()
        .and_then(|c| CommandAgent::new(&agent.name, c, &agent.args));
    match command {
        Some(command) => Box::new(command),
        None => Box::new(OfflineAgent::new(&agent.name)),
    }
}

/// Pick the reply producer for a model kind.
pub fn for_kind(config: &Config, kind: AgentKind) -> Result<Box<dyn ReplyAgent>> {
    match config.agent(kind) {
        Some(agent) => Ok(from_config(agent)),
        None => bail!("invalid agent kind for a model turn: {kind}"),
    }
}

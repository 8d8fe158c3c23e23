//! Line-oriented conversation loop.
//!
//! Lines accumulate into one message until a blank line (or end of input)
//! sends it. A single-word line typed while nothing is pending is a command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use ng_core::{AgentKind, Conversation, Protocol, TurnError, wants_auto_reply};
use ng_store::DataDir;

use crate::agents;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    Save,
    Turn(&'static [AgentKind]),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.to_ascii_lowercase().as_str() {
            "quit" | "exit" => Some(Command::Quit),
            "save" => Some(Command::Save),
            "model-a" | "gpt" => Some(Command::Turn(&[AgentKind::ModelA])),
            "model-b" | "claude" => Some(Command::Turn(&[AgentKind::ModelB])),
            "both" => Some(Command::Turn(&[AgentKind::ModelA, AgentKind::ModelB])),
            _ => None,
        }
    }
}

const HELP: &str = "\
Commands (on an empty line):
  model-a   ask the first model for a turn
  model-b   ask the second model for a turn
  both      ask both models
  save      save the conversation
  quit      end the session
Otherwise type a NeuroGlyph message; a blank line sends it.";

pub struct Session<'a> {
    data: &'a DataDir,
    protocol: Protocol,
    conversation: Conversation,
}

impl<'a> Session<'a> {
    pub fn new(data: &'a DataDir, conversation: Conversation) -> Self {
        Self {
            data,
            protocol: Protocol::neuroglyph(),
            conversation,
        }
    }

    /// Open the conversation with the synthesized system message.
    pub fn start(
        &mut self,
        topic: &str,
        participants: &[String],
        context: Option<&str>,
        intent: Option<&str>,
        out: &mut impl Write,
    ) -> Result<()> {
        let init = self
            .conversation
            .initialize(&self.protocol, topic, participants, context, intent);
        writeln!(out, "[{}]: {}", init.agent, init.raw_text)?;
        writeln!(out)?;
        writeln!(out, "{HELP}")?;
        Ok(())
    }

    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        let mut pending: Vec<String> = Vec::new();

        for line in input.lines() {
            let line = line.context("failed to read input")?;
            let trimmed = line.trim();

            if pending.is_empty()
                && let Some(command) = Command::parse(trimmed)
            {
                match command {
                    Command::Quit => {
                        tracing::debug!("session ended by user");
                        return Ok(());
                    }
                    Command::Save => {
                        let path = self.save()?;
                        writeln!(out, "saved to {}", path.display())?;
                    }
                    Command::Turn(kinds) => {
                        for &kind in kinds {
                            self.model_turn(kind, "", out)?;
                        }
                    }
                }
                continue;
            }

            if trimmed.is_empty() {
                if !pending.is_empty() {
                    self.send(&pending.join("\n"), out)?;
                    pending.clear();
                }
                continue;
            }
            pending.push(line);
        }

        if !pending.is_empty() {
            self.send(&pending.join("\n"), out)?;
        }
        Ok(())
    }

    /// Append a human message, report diagnostics, and let both models
    /// answer when the message asks for it.
    fn send(&mut self, text: &str, out: &mut impl Write) -> Result<()> {
        let diagnostics = {
            let message = self
                .conversation
                .add_message(&self.protocol, text, "Human", AgentKind::Human);
            writeln!(out, "[You]: {}", message.raw_text)?;
            message.diagnostics(&self.protocol)
        };
        for d in &diagnostics {
            writeln!(out, "  {}: {}", d.severity.as_str(), d.message)?;
        }

        let auto_reply = self.conversation.last().is_some_and(wants_auto_reply);
        if auto_reply {
            for kind in [AgentKind::ModelA, AgentKind::ModelB] {
                self.model_turn(kind, text, out)?;
            }
        }
        Ok(())
    }

    fn model_turn(&mut self, kind: AgentKind, prompt: &str, out: &mut impl Write) -> Result<()> {
        let agent = agents::for_kind(self.data.config(), kind)?;
        match self
            .conversation
            .take_turn(&self.protocol, agent.as_ref(), kind, prompt)
        {
            Ok(message) => writeln!(out, "[{}]: {}", message.agent, message.raw_text)?,
            Err(e @ TurnError::Reply { .. }) => {
                tracing::warn!("{e}");
                writeln!(out, "({} did not reply)", agent.name())?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    pub fn save(&self) -> Result<PathBuf> {
        self.data
            .conversations()
            .save(&self.conversation)
            .context("failed to save conversation")
    }

    #[cfg(test)]
    fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

//! Command model
//!
//! A command is one executable step of a build: a type tag, a shell script,
//! an environment overlay and its position in the plan.
//!
//! Commands are first described as [`FutureCommand`]s (no position yet) and
//! then placed with [`sequence`] or [`FutureCommand::as_command`], which fix
//! their order index for the rest of the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Kind of step a command performs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// Prepares the executor (package sources, toolchains, dependencies)
    Setup,
    /// The build's main script
    #[default]
    #[serde(alias = "default")]
    Script,
    /// Cleans up after the main script
    Teardown,
    /// Discovers bazel targets and emits the test list
    CollectTargets,
    /// Discovers tests for a sharded build
    CollectTests,
    /// Restores the executor to a clean state
    Reset,
}

impl CommandType {
    /// Wire name of the command type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Script => "script",
            Self::Teardown => "teardown",
            Self::CollectTargets => "collect_targets",
            Self::CollectTests => "collect_tests",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command that has not been given a position yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureCommand {
    /// Shell script body
    pub script: String,

    /// Command type
    #[serde(rename = "type", default)]
    pub command_type: CommandType,

    /// Environment overlay
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl FutureCommand {
    /// Create a command with an empty environment
    pub fn new(command_type: CommandType, script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            command_type,
            env: BTreeMap::new(),
        }
    }

    /// Add one environment variable
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Overlay a whole environment; later values replace earlier ones
    #[must_use]
    pub fn with_env_map(self, env: &BTreeMap<String, String>) -> Self {
        env.iter()
            .fold(self, |command, (key, value)| command.with_env(key, value))
    }

    /// Place this command in a plan at `order`
    pub fn into_command(self, order: usize) -> Command {
        Command {
            jobstep_id: None,
            order,
            command_type: self.command_type,
            script: self.script,
            env: self.env,
        }
    }

    /// Materialize this command for a job step at `order`
    pub fn as_command(&self, jobstep_id: Uuid, order: usize) -> Command {
        Command {
            jobstep_id: Some(jobstep_id),
            ..self.clone().into_command(order)
        }
    }
}

/// A positioned command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Job step the command was materialized for (None inside a compiled plan)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobstep_id: Option<Uuid>,

    /// Position in execution order, starting at 0
    pub order: usize,

    /// Command type
    #[serde(rename = "type")]
    pub command_type: CommandType,

    /// Shell script body
    pub script: String,

    /// Environment overlay
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Assign consecutive order indices, starting at 0, in list order
pub fn sequence(commands: Vec<FutureCommand>) -> Vec<Command> {
    commands
        .into_iter()
        .enumerate()
        .map(|(order, command)| command.into_command(order))
        .collect()
}

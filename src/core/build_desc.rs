//! Build type descriptions
//!
//! A build description is the declarative record behind a build type name:
//! whether the step runs through the client, which adapter and scheduler
//! command it uses, LXC overrides, snapshot eligibility and the commands to
//! materialize for each job step.

use serde::{Deserialize, Serialize};

use crate::core::command::FutureCommand;
use crate::error::SettingsError;

/// Declarative description of one build type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescription {
    /// Whether the step is driven by the client on the executor
    #[serde(default)]
    pub uses_client: bool,

    /// Scheduler command the client is started with
    #[serde(default, rename = "jenkins-command", skip_serializing_if = "Option::is_none")]
    pub jenkins_command: Option<String>,

    /// Client adapter identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,

    /// LXC pre-launch override
    #[serde(default, rename = "pre-launch", skip_serializing_if = "Option::is_none")]
    pub pre_launch: Option<String>,

    /// LXC post-launch override
    #[serde(default, rename = "post-launch", skip_serializing_if = "Option::is_none")]
    pub post_launch: Option<String>,

    /// LXC release override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    /// Whether steps of this type may produce snapshot images
    #[serde(default)]
    pub can_snapshot: bool,

    /// Commands materialized for every job step of this type
    #[serde(default)]
    pub commands: Vec<FutureCommand>,
}

/// Client keys of a build description that uses the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientKeys<'a> {
    /// Scheduler command
    pub jenkins_command: &'a str,
    /// Client adapter
    pub adapter: &'a str,
}

impl BuildDescription {
    /// Check that a client build type names its scheduler command and adapter
    pub fn validate(&self, build_type: &str) -> Result<(), SettingsError> {
        if !self.uses_client {
            return Ok(());
        }
        if self.jenkins_command.is_none() {
            return Err(SettingsError::MissingBuildTypeKey {
                build_type: build_type.to_string(),
                key: "jenkins-command".to_string(),
            });
        }
        if self.adapter.is_none() {
            return Err(SettingsError::MissingBuildTypeKey {
                build_type: build_type.to_string(),
                key: "adapter".to_string(),
            });
        }
        Ok(())
    }

    /// Client keys, present only when the description uses the client
    pub fn client_keys(&self) -> Option<ClientKeys<'_>> {
        if !self.uses_client {
            return None;
        }
        Some(ClientKeys {
            jenkins_command: self.jenkins_command.as_deref()?,
            adapter: self.adapter.as_deref()?,
        })
    }
}

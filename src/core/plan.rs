//! Build-plan compiler
//!
//! Turns a build mode and the project's configuration into a
//! [`BuildImplementation`]: ordered commands, a validated resource request
//! and artifact metadata.
//!
//! Three modes exist:
//!
//! - **generic**: setup, script and teardown as single commands
//! - **sharded**: the collector runs setup, test collection and teardown;
//!   shards have their own setup, teardown and build type, which is what a
//!   snapshot of a sharded build must be made from
//! - **autogenerated**: a bazel bootstrap, one dependency sync per provider
//!   group and one target collection command, all derived from the
//!   project's `bazel.*` keys
//!
//! A resource request outside the cluster limits compiles to `Ok(None)`:
//! the build is not scheduled, and nothing of the plan is kept.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

use crate::config::defaults::{
    BAZEL_ARTIFACT_SUFFIX, DEFAULT_CPUS, DEFAULT_MAX_EXECUTORS, DEFAULT_MEM_MB,
};
use crate::core::command::{sequence, Command, CommandType, FutureCommand};
use crate::core::project_config::ProjectConfig;
use crate::core::resources::{validate, ResourceLimits, ResourceRequest};
use crate::core::settings::Settings;
use crate::core::templates::{bazel_setup_script, encap_sync_script, CollectTargetsArgs};
use crate::error::CompileError;

/// Resources a step asks for, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// CPUs per executor
    #[serde(default = "default_cpus")]
    pub cpus: i64,

    /// Memory per executor in MiB
    #[serde(default = "default_mem", rename = "mem")]
    pub mem_mb: i64,

    /// Executor fan-out
    #[serde(default = "default_max_executors")]
    pub max_executors: i64,
}

fn default_cpus() -> i64 {
    DEFAULT_CPUS
}

fn default_mem() -> i64 {
    DEFAULT_MEM_MB
}

fn default_max_executors() -> i64 {
    DEFAULT_MAX_EXECUTORS
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            cpus: default_cpus(),
            mem_mb: default_mem(),
            max_executors: default_max_executors(),
        }
    }
}

impl ResourceSpec {
    /// Validate against the limits; a rejection is logged and gives `None`
    fn accept(&self, limits: &ResourceLimits, mode: &str) -> Option<ResourceRequest> {
        match validate(self.cpus, self.mem_mb, self.max_executors, limits) {
            Ok(request) => Some(request),
            Err(reason) => {
                tracing::warn!("Rejecting {mode} build plan: {reason}");
                None
            }
        }
    }
}

/// A build that runs one script between setup and teardown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericBuild {
    /// Setup script
    #[serde(default)]
    pub setup_script: String,

    /// Main script
    pub script: String,

    /// Teardown script
    #[serde(default)]
    pub teardown_script: String,

    /// Artifact file names the build collects
    #[serde(default)]
    pub artifacts: Vec<String>,

    /// Requested resources
    #[serde(default)]
    pub resources: ResourceSpec,
}

/// A build whose collector fans tests out to shards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardedBuild {
    /// Collector setup script
    #[serde(default)]
    pub setup_script: String,

    /// Test collection script run by the collector
    pub script: String,

    /// Collector teardown script
    #[serde(default)]
    pub teardown_script: String,

    /// Setup script run on each shard
    #[serde(default)]
    pub shard_setup_script: String,

    /// Teardown script run on each shard
    #[serde(default)]
    pub shard_teardown_script: String,

    /// Build type shards run with (the step's build type when unset)
    #[serde(default)]
    pub shard_build_type: Option<String>,

    /// Artifact file names the build collects
    #[serde(default)]
    pub artifacts: Vec<String>,

    /// Requested resources; `max_executors` bounds the shard count
    #[serde(default)]
    pub resources: ResourceSpec,
}

/// How a step's plan is produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildMode {
    /// Setup, script, teardown
    Generic(GenericBuild),
    /// Collector plus shards
    Sharded(ShardedBuild),
    /// Bazel target matrix generated from project config
    Autogenerated,
}

impl BuildMode {
    /// Mode name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic(_) => "generic",
            Self::Sharded(_) => "sharded",
            Self::Autogenerated => "autogenerated",
        }
    }

    /// Compile the plan for this mode
    ///
    /// Returns `Ok(None)` when the requested resources are outside the
    /// limits in `settings`.
    pub fn compile(
        &self,
        project: &ProjectConfig,
        settings: &Settings,
    ) -> Result<Option<BuildImplementation>, CompileError> {
        let plan = match self {
            Self::Generic(build) => compile_generic(build, &settings.limits),
            Self::Sharded(build) => compile_sharded(build, &settings.limits),
            Self::Autogenerated => compile_autogenerated(project, settings)?,
        };

        if let Some(ref plan) = plan {
            tracing::info!(
                "Compiled {} build plan: {} commands, {} executors",
                self.name(),
                plan.commands().len(),
                plan.max_executors()
            );
        }
        Ok(plan)
    }

    /// Build type a snapshot must be made with, when it differs from the step's
    pub fn snapshot_build_type(&self) -> Option<&str> {
        match self {
            Self::Sharded(build) => build.shard_build_type.as_deref(),
            Self::Generic(_) | Self::Autogenerated => None,
        }
    }

    /// Setup script a snapshot must be made with
    pub fn snapshot_setup_script(&self, plan: &BuildImplementation) -> String {
        match self {
            Self::Sharded(build) => build.shard_setup_script.clone(),
            Self::Generic(_) | Self::Autogenerated => plan.setup_script(),
        }
    }

    /// Teardown script a snapshot must be made with
    pub fn snapshot_teardown_script(&self, plan: &BuildImplementation) -> String {
        match self {
            Self::Sharded(build) => build.shard_teardown_script.clone(),
            Self::Generic(_) | Self::Autogenerated => plan.teardown_script(),
        }
    }
}

/// Setup, main and teardown commands; empty setup/teardown are left out
fn framed(
    setup_script: &str,
    main_type: CommandType,
    script: &str,
    teardown_script: &str,
) -> Vec<FutureCommand> {
    let mut commands = Vec::with_capacity(3);
    if !setup_script.is_empty() {
        commands.push(FutureCommand::new(CommandType::Setup, setup_script));
    }
    commands.push(FutureCommand::new(main_type, script));
    if !teardown_script.is_empty() {
        commands.push(FutureCommand::new(CommandType::Teardown, teardown_script));
    }
    commands
}

fn compile_generic(build: &GenericBuild, limits: &ResourceLimits) -> Option<BuildImplementation> {
    let resources = build.resources.accept(limits, "generic")?;
    Some(BuildImplementation::new(
        framed(
            &build.setup_script,
            CommandType::Script,
            &build.script,
            &build.teardown_script,
        ),
        resources,
        build.artifacts.iter().cloned().collect(),
        String::new(),
    ))
}

fn compile_sharded(build: &ShardedBuild, limits: &ResourceLimits) -> Option<BuildImplementation> {
    let resources = build.resources.accept(limits, "sharded")?;
    Some(BuildImplementation::new(
        framed(
            &build.setup_script,
            CommandType::CollectTests,
            &build.script,
            &build.teardown_script,
        ),
        resources,
        build.artifacts.iter().cloned().collect(),
        String::new(),
    ))
}

fn compile_autogenerated(
    project: &ProjectConfig,
    settings: &Settings,
) -> Result<Option<BuildImplementation>, CompileError> {
    let bazel = &project.bazel;
    let spec = ResourceSpec {
        cpus: bazel.cpus,
        mem_mb: bazel.mem_mb,
        max_executors: bazel.max_executors,
    };
    let Some(resources) = spec.accept(&settings.limits, "autogenerated") else {
        return Ok(None);
    };

    let packages = &settings.packages;
    let collect = CollectTargetsArgs {
        apt_spec: packages.apt_spec.clone(),
        bazel_apt_pkgs: packages.bazel_apt_pkgs.join(" "),
        bazel_root: packages.bazel_root_path.clone(),
        bazel_targets: bazel.targets.join(","),
        bazel_exclude_tags: bazel.exclude_tags.join(","),
        max_jobs: resources.max_jobs(),
    };

    let commands = vec![
        FutureCommand::new(CommandType::Setup, bazel_setup_script(packages)?),
        FutureCommand::new(
            CommandType::Setup,
            encap_sync_script(packages, &bazel.dependencies.encap)?,
        ),
        FutureCommand::new(CommandType::CollectTargets, collect.render()?),
    ];

    Ok(Some(BuildImplementation::new(
        commands,
        resources,
        BTreeSet::new(),
        BAZEL_ARTIFACT_SUFFIX.to_string(),
    )))
}

/// A compiled build plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildImplementation {
    commands: Vec<Command>,
    resources: ResourceRequest,
    artifacts: BTreeSet<String>,
    artifact_suffix: String,
}

impl BuildImplementation {
    /// Sequence `commands` from index 0 and freeze the plan
    pub fn new(
        commands: Vec<FutureCommand>,
        resources: ResourceRequest,
        artifacts: BTreeSet<String>,
        artifact_suffix: String,
    ) -> Self {
        Self {
            commands: sequence(commands),
            resources,
            artifacts,
            artifact_suffix,
        }
    }

    /// Commands in execution order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Validated resource request
    pub fn resources(&self) -> &ResourceRequest {
        &self.resources
    }

    /// Artifact file names
    pub fn artifacts(&self) -> &BTreeSet<String> {
        &self.artifacts
    }

    /// Suffix of artifacts reported by the build
    pub fn artifact_suffix(&self) -> &str {
        &self.artifact_suffix
    }

    /// Executor fan-out
    pub fn max_executors(&self) -> u32 {
        self.resources.max_executors
    }

    /// Setup commands' scripts, one per line
    pub fn setup_script(&self) -> String {
        self.join_scripts(|t| t == CommandType::Setup)
    }

    /// Main commands' scripts, one per line
    pub fn main_script(&self) -> String {
        self.join_scripts(|t| !matches!(t, CommandType::Setup | CommandType::Teardown))
    }

    /// Teardown commands' scripts, one per line
    pub fn teardown_script(&self) -> String {
        self.join_scripts(|t| t == CommandType::Teardown)
    }

    fn join_scripts(&self, select: impl Fn(CommandType) -> bool) -> String {
        self.commands
            .iter()
            .filter(|c| select(c.command_type))
            .map(|c| c.script.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// SHA-256 of the plan's canonical JSON, lowercase hex
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let canonical = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(hex::encode(hasher.finalize()))
    }
}

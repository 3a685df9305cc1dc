//! Builder orchestration
//!
//! A [`Builder`] is constructed once per build step. Construction resolves
//! the build type, the snapshot build type and the cluster's master URLs, so
//! a misconfigured step fails before anything is dispatched.
//!
//! Dispatching a step then goes: compile the plan, translate it into
//! scheduler parameters (cluster selection, overrides, snapshot
//! substitution), and materialize the build description's commands.

use serde::{Deserialize, Serialize};

use crate::core::build_desc::BuildDescription;
use crate::core::command::Command;
use crate::core::context::{JobContext, JobStep};
use crate::core::params::{
    params_to_env, repository_url, select_cluster, translate, ClientParams, JobParameter,
    TranslationInput,
};
use crate::core::plan::{BuildImplementation, BuildMode};
use crate::core::project_config::ProjectConfig;
use crate::core::settings::Settings;
use crate::core::snapshot::{SnapshotResolver, SnapshotVariants, StepScripts};
use crate::core::store::PlanStore;
use crate::core::vcs::Vcs;
use crate::error::{BuilderError, CompileError};

/// Build step configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderOptions {
    /// Build type (the settings' default when unset)
    #[serde(default)]
    pub build_type: Option<String>,

    /// Primary cluster
    pub cluster: String,

    /// Cluster for diff builds
    #[serde(default)]
    pub diff_cluster: Option<String>,

    /// Scheduler masters (the cluster's configured masters when empty)
    #[serde(default)]
    pub master_urls: Vec<String>,

    /// Reset script
    #[serde(default)]
    pub reset_script: String,

    /// Working directory inside the checkout
    #[serde(default)]
    pub path: String,

    /// Workspace
    #[serde(default)]
    pub workspace: String,

    /// Build mode
    pub mode: BuildMode,
}

/// Per-call replacements of the builder's own values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOverrides {
    /// Setup script
    pub setup_script: Option<String>,
    /// Main script
    pub script: Option<String>,
    /// Teardown script
    pub teardown_script: Option<String>,
    /// Working directory
    pub path: Option<String>,
}

/// Orchestrates one build step
#[derive(Debug, Clone)]
pub struct Builder<'s> {
    settings: &'s Settings,
    options: BuilderOptions,
    build_type: String,
    build_desc: &'s BuildDescription,
    snapshot_desc: &'s BuildDescription,
    master_urls: Vec<String>,
}

impl<'s> Builder<'s> {
    /// Resolve a builder's configuration against `settings`
    pub fn new(settings: &'s Settings, options: BuilderOptions) -> Result<Self, BuilderError> {
        let build_type = options
            .build_type
            .clone()
            .unwrap_or_else(|| settings.default_build_type.clone());
        let build_desc = lookup(settings, &build_type)?;

        let snapshot_desc = match options.mode.snapshot_build_type() {
            Some(name) => lookup(settings, name)?,
            None => build_desc,
        };

        let master_urls = if options.master_urls.is_empty() {
            settings
                .master_urls(&options.cluster)
                .map(<[String]>::to_vec)
                .ok_or_else(|| BuilderError::UnknownCluster {
                    name: options.cluster.clone(),
                })?
        } else {
            options.master_urls.clone()
        };

        tracing::debug!(
            "Builder for build type {build_type} on cluster {} ({} masters)",
            options.cluster,
            master_urls.len()
        );

        Ok(Self {
            settings,
            options,
            build_type,
            build_desc,
            snapshot_desc,
            master_urls,
        })
    }

    /// Effective build type name
    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    /// Build description of the step
    pub fn build_desc(&self) -> &BuildDescription {
        self.build_desc
    }

    /// Scheduler masters
    pub fn master_urls(&self) -> &[String] {
        &self.master_urls
    }

    /// Whether steps of this build type may produce snapshot images
    pub fn can_snapshot(&self) -> bool {
        self.build_desc.can_snapshot
    }

    /// Compile the step's plan; `Ok(None)` when resources are rejected
    pub fn compile(
        &self,
        project: &ProjectConfig,
    ) -> Result<Option<BuildImplementation>, CompileError> {
        self.options.mode.compile(project, self.settings)
    }

    /// Scheduler parameters for a job step
    pub fn job_parameters<S: PlanStore + ?Sized>(
        &self,
        ctx: &JobContext,
        plan: &BuildImplementation,
        overrides: ParameterOverrides,
        store: &S,
        vcs: Option<&dyn Vcs>,
    ) -> Result<Vec<JobParameter>, BuilderError> {
        let scripts = StepScripts {
            build_desc: self.build_desc,
            setup: overrides
                .setup_script
                .unwrap_or_else(|| plan.setup_script()),
            script: overrides.script.unwrap_or_else(|| plan.main_script()),
            teardown: overrides
                .teardown_script
                .unwrap_or_else(|| plan.teardown_script()),
        };
        let work_path = overrides
            .path
            .unwrap_or_else(|| self.options.path.clone());

        let image = SnapshotResolver::new(store).resolve(ctx.job.id)?;
        let variants = SnapshotVariants {
            build_desc: self.snapshot_desc,
            setup: self.options.mode.snapshot_setup_script(plan),
            teardown: self.options.mode.snapshot_teardown_script(plan),
        };
        let (scripts, snapshot_id) = scripts.with_snapshot(image.as_ref(), variants);

        let client = scripts
            .build_desc
            .client_keys()
            .map(|keys| ClientParams::new(keys, self.build_desc, self.settings, &snapshot_id));

        let input = TranslationInput {
            jobstep_id: ctx.jobstep.id,
            project_slug: &ctx.project.slug,
            repo_url: repository_url(&ctx.repository, vcs),
            scripts,
            reset_script: &self.options.reset_script,
            backend: ctx.repository.backend,
            cluster: select_cluster(
                &self.options.cluster,
                self.options.diff_cluster.as_deref(),
                &ctx.source,
            ),
            work_path: &work_path,
            workspace: &self.options.workspace,
            client,
        };

        Ok(translate(&input))
    }

    /// Materialize the build description's commands for a job step
    ///
    /// One command per listed command, in order, indexed from 0, each with
    /// the full parameter environment. Every command is persisted.
    pub fn create_commands<S: PlanStore + ?Sized>(
        &self,
        jobstep: &JobStep,
        params: &[JobParameter],
        store: &mut S,
    ) -> Result<Vec<Command>, BuilderError> {
        let env = params_to_env(params);
        let mut commands = Vec::with_capacity(self.build_desc.commands.len());

        for (index, future) in self.build_desc.commands.iter().enumerate() {
            let command = future
                .clone()
                .with_env_map(&env)
                .as_command(jobstep.id, index);
            store.persist(&command)?;
            commands.push(command);
        }

        tracing::info!(
            "Materialized {} commands for job step {}",
            commands.len(),
            jobstep.id
        );
        Ok(commands)
    }
}

/// Resolve and validate a build type; settings built in code skip load-time checks
fn lookup<'s>(settings: &'s Settings, name: &str) -> Result<&'s BuildDescription, BuilderError> {
    let desc = settings
        .build_desc(name)
        .map_err(|_| BuilderError::UnknownBuildType {
            name: name.to_string(),
        })?;
    desc.validate(name)?;
    Ok(desc)
}

//! Job plans
//!
//! A job plan binds a project to one build step plus free-form plan options.
//! The option `bazel.autogenerate = "1"` switches the step to the
//! autogenerated bazel mode, whose commands come from the project's
//! configuration instead of the step's own scripts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::defaults::AUTOGENERATE_OPTION;
use crate::core::builder::{Builder, BuilderOptions, ParameterOverrides};
use crate::core::command::Command;
use crate::core::context::JobContext;
use crate::core::params::JobParameter;
use crate::core::plan::{BuildImplementation, BuildMode};
use crate::core::project_config::ProjectConfig;
use crate::core::settings::Settings;
use crate::core::store::PlanStore;
use crate::core::vcs::Vcs;
use crate::error::{BuilderError, CompileError};

/// A project's plan: options plus its build step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPlan {
    /// Plan options
    #[serde(default)]
    pub options: BTreeMap<String, String>,

    /// Build step
    pub step: BuilderOptions,
}

/// Result of dispatching a job step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatch {
    /// Compiled plan
    pub plan: BuildImplementation,
    /// Scheduler parameters
    pub params: Vec<JobParameter>,
    /// Materialized commands
    pub commands: Vec<Command>,
}

impl JobPlan {
    /// Whether the plan asks for an autogenerated bazel build
    pub fn is_autogenerated(&self) -> bool {
        self.options.get(AUTOGENERATE_OPTION).map(String::as_str) == Some("1")
    }

    /// Build mode the step is compiled with
    pub fn mode(&self) -> BuildMode {
        if self.is_autogenerated() {
            BuildMode::Autogenerated
        } else {
            self.step.mode.clone()
        }
    }

    /// Builder for the plan's step
    pub fn builder<'s>(&self, settings: &'s Settings) -> Result<Builder<'s>, BuilderError> {
        let options = BuilderOptions {
            mode: self.mode(),
            ..self.step.clone()
        };
        Builder::new(settings, options)
    }

    /// Compile the plan for a project
    ///
    /// The project configuration is only fetched for autogenerated builds.
    pub fn implementation<S: PlanStore + ?Sized>(
        &self,
        builder: &Builder<'_>,
        ctx: &JobContext,
        store: &S,
    ) -> Result<Option<BuildImplementation>, BuilderError> {
        let project = if self.is_autogenerated() {
            let map = store.project_config(ctx.project.id)?;
            ProjectConfig::from_map(&map).map_err(CompileError::from)?
        } else {
            ProjectConfig::default()
        };
        Ok(builder.compile(&project)?)
    }

    /// Compile, translate and materialize a job step
    ///
    /// Returns `Ok(None)` when the plan's resources are rejected; nothing is
    /// persisted in that case.
    pub fn dispatch<S: PlanStore + ?Sized>(
        &self,
        settings: &Settings,
        ctx: &JobContext,
        store: &mut S,
        vcs: Option<&dyn Vcs>,
    ) -> Result<Option<Dispatch>, BuilderError> {
        let builder = self.builder(settings)?;
        let Some(plan) = self.implementation(&builder, ctx, store)? else {
            return Ok(None);
        };

        let params =
            builder.job_parameters(ctx, &plan, ParameterOverrides::default(), store, vcs)?;
        let commands = builder.create_commands(&ctx.jobstep, &params, store)?;

        Ok(Some(Dispatch {
            plan,
            params,
            commands,
        }))
    }
}

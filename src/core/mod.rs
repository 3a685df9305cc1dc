//! Core business logic module
//!
//! This module contains all business logic for buildplan.
//! It has NO I/O operations except loading settings - persistence and VCS
//! access go through the [`store::PlanStore`] and [`vcs::Vcs`] seams, whose
//! implementations live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`command`] - Command model and sequencing
//! - [`resources`] - Resource validation against cluster limits
//! - [`build_desc`] - Build type descriptions
//! - [`settings`] - Process-wide settings
//! - [`project_config`] - Typed project configuration
//! - [`templates`] - Script templates for autogenerated builds
//! - [`plan`] - Build-plan compiler
//! - [`snapshot`] - Snapshot resolution and substitution
//! - [`params`] - Scheduler parameter translation
//! - [`builder`] - Builder orchestration
//! - [`jobplan`] - Job plans and dispatch
//! - [`context`] - Job step context
//! - [`store`] - Persistence seam
//! - [`vcs`] - Version control seam

pub mod build_desc;
pub mod builder;
pub mod command;
pub mod context;
pub mod jobplan;
pub mod params;
pub mod plan;
pub mod project_config;
pub mod resources;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod templates;
pub mod vcs;

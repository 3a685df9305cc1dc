//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

use buildplan::core::context::{Job, JobContext, JobStep, Project, Repository, Source, VcsBackend};
use buildplan::core::settings::Settings;
use uuid::Uuid;

pub const PROJECT_ID: &str = "0c6a3a4e-8a0f-4c55-9d83-5d1f3c7b2a01";
pub const REPOSITORY_ID: &str = "0c6a3a4e-8a0f-4c55-9d83-5d1f3c7b2a02";
pub const JOB_ID: &str = "0c6a3a4e-8a0f-4c55-9d83-5d1f3c7b2a03";
pub const JOBSTEP_ID: &str = "0c6a3a4e-8a0f-4c55-9d83-5d1f3c7b2a04";
pub const IMAGE_ID: &str = "0c6a3a4e-8a0f-4c55-9d83-5d1f3c7b2a05";

/// Settings with a legacy and a client build type and two clusters
pub const SAMPLE_SETTINGS: &str = r#"
default_build_type = "legacy"
server_url = "https://changes.example.com/"
snapshot_bucket = "snapshots"

[limits]
max_cpus_per_executor = 8
min_mem_mb_per_executor = 1024
max_mem_mb_per_executor = 16384

[lxc]
pre_launch = "pre-launch.sh"
post_launch = "post-launch.sh"

[packages]
apt_spec = "deb http://example.com/debian distribution component1"
bazel_apt_pkgs = ["bazel"]
bazel_root_path = "/bazel/root/path"
encap_rsync_url = "rsync://example.com/encap/"

[clusters]
default = ["https://jenkins.example.com"]
diffs = ["https://jenkins-diffs.example.com"]

[build_types.legacy]

[build_types.client]
uses_client = true
jenkins-command = "changes-client"
adapter = "basic"
release = "precise"
can_snapshot = true
commands = [
    { script = "changes-client --setup", type = "setup" },
    { script = "changes-client --run" },
]
"#;

/// Temporary directory holding settings and job files
pub struct TestProject {
    /// Temporary directory for the test files
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test directory and return its path
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write the sample settings and return their path
    pub fn with_settings(&self) -> PathBuf {
        self.create_file("settings.toml", SAMPLE_SETTINGS)
    }

    /// Write a job file and return its path
    pub fn with_job(&self, job: &Value) -> PathBuf {
        self.create_file("job.json", &job.to_string())
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Parsed sample settings
pub fn settings() -> Settings {
    Settings::from_toml(SAMPLE_SETTINGS).expect("sample settings are valid")
}

fn uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("valid uuid")
}

/// Job context for a commit (or a diff when `diff` is set)
pub fn context(diff: bool) -> JobContext {
    JobContext {
        project: Project {
            id: uuid(PROJECT_ID),
            slug: "server".to_string(),
        },
        repository: Repository {
            id: uuid(REPOSITORY_ID),
            url: "https://example.com/server.git".to_string(),
            backend: VcsBackend::Git,
            local_path: None,
        },
        job: Job { id: uuid(JOB_ID) },
        jobstep: JobStep {
            id: uuid(JOBSTEP_ID),
        },
        source: Source {
            revision_sha: "4b825dc642cb6eb9a060e54bf8d69288fbee4904".to_string(),
            patch_id: diff.then(|| uuid(IMAGE_ID)),
        },
    }
}

/// Generic build step as job plan JSON
pub fn generic_step(build_type: &str) -> Value {
    json!({
        "build_type": build_type,
        "cluster": "default",
        "diff_cluster": "diffs",
        "reset_script": "reset.sh",
        "path": "src",
        "workspace": "ws",
        "mode": {
            "type": "generic",
            "setup_script": "setup.sh",
            "script": "make test",
            "teardown_script": "teardown.sh",
            "artifacts": ["junit.xml"]
        }
    })
}

/// Full job file JSON
pub fn job_file(options: Value, step: Value, project_config: Value, snapshots: bool) -> Value {
    let snapshots = if snapshots {
        json!([{"id": IMAGE_ID, "job_id": JOB_ID}])
    } else {
        json!([])
    };
    json!({
        "context": serde_json::to_value(context(false)).expect("context serializes"),
        "plan": {"options": options, "step": step},
        "project_config": project_config,
        "snapshots": snapshots,
    })
}

/// Project configuration for an autogenerated bazel build
pub fn bazel_config() -> Value {
    json!({
        "bazel.targets": ["//foo/bar/baz/...", "//bar/bax/..."],
        "bazel.dependencies": {"encap": ["package1", "pkg-2"]},
        "bazel.exclude-tags": ["flaky", "another_tag"],
        "bazel.cpus": 2,
        "bazel.mem": 1234,
        "bazel.max-executors": 3
    })
}

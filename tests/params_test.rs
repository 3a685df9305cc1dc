//! Integration tests for scheduler parameter translation
//!
//! Covers parameter order, client parameters, snapshot substitution and
//! cluster selection through the public builder API.

mod common;

use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

use buildplan::core::builder::{Builder, BuilderOptions, ParameterOverrides};
use buildplan::core::params::{params_to_env, JobParameter};
use buildplan::core::snapshot::SnapshotImage;
use buildplan::infra::memory_store::MemoryStore;

fn options(build_type: &str) -> BuilderOptions {
    serde_json::from_value(common::generic_step(build_type)).unwrap()
}

fn translate(
    build_type: &str,
    diff: bool,
    store: &MemoryStore,
) -> (Vec<JobParameter>, BTreeMap<String, String>) {
    let settings = common::settings();
    let builder = Builder::new(&settings, options(build_type)).unwrap();
    let plan = builder
        .compile(&Default::default())
        .unwrap()
        .unwrap();
    let params = builder
        .job_parameters(
            &common::context(diff),
            &plan,
            ParameterOverrides::default(),
            store,
            None,
        )
        .unwrap();
    let env = params_to_env(&params);
    (params, env)
}

fn image() -> SnapshotImage {
    SnapshotImage {
        id: Uuid::parse_str(common::IMAGE_ID).unwrap(),
        job_id: Uuid::parse_str(common::JOB_ID).unwrap(),
    }
}

#[test]
fn test_client_parameter_list() {
    let (params, _) = translate("client", false, &MemoryStore::new());

    let expected = json!([
        {"name": "CHANGES_BID", "value": "0c6a3a4e8a0f4c559d835d1f3c7b2a04"},
        {"name": "CHANGES_PID", "value": "server"},
        {"name": "REPO_URL", "value": "https://example.com/server.git"},
        {"name": "SETUP_SCRIPT", "value": "setup.sh"},
        {"name": "SCRIPT", "value": "make test"},
        {"name": "TEARDOWN_SCRIPT", "value": "teardown.sh"},
        {"name": "RESET_SCRIPT", "value": "reset.sh"},
        {"name": "REPO_VCS", "value": "git"},
        {"name": "CLUSTER", "value": "default"},
        {"name": "WORK_PATH", "value": "src"},
        {"name": "C_WORKSPACE", "value": "ws"},
        {"name": "JENKINS_COMMAND", "value": "changes-client"},
        {"name": "CHANGES_CLIENT_ADAPTER", "value": "basic"},
        {"name": "CHANGES_CLIENT_SERVER", "value": "https://changes.example.com/api/0"},
        {"name": "CHANGES_CLIENT_SNAPSHOT_BUCKET", "value": "snapshots"},
        {"name": "CHANGES_CLIENT_SNAPSHOT_ID", "value": ""},
        {"name": "CHANGES_CLIENT_LXC_PRE_LAUNCH", "value": "pre-launch.sh"},
        {"name": "CHANGES_CLIENT_LXC_POST_LAUNCH", "value": "post-launch.sh"},
        {"name": "CHANGES_CLIENT_LXC_RELEASE", "value": "precise"},
    ]);
    assert_eq!(serde_json::to_value(&params).unwrap(), expected);
}

#[test]
fn test_legacy_build_sends_base_parameters_only() {
    let (params, env) = translate("legacy", false, &MemoryStore::new());
    assert_eq!(params.len(), 11);
    assert!(!env.contains_key("JENKINS_COMMAND"));
}

#[test]
fn test_expected_image_substitutes_noop_script() {
    let store = MemoryStore::new().with_image(image());
    let (_, env) = translate("client", false, &store);

    assert_eq!(env["SCRIPT"], ":");
    assert_eq!(env["SETUP_SCRIPT"], "setup.sh");
    assert_eq!(env["TEARDOWN_SCRIPT"], "teardown.sh");
    assert_eq!(
        env["CHANGES_CLIENT_SNAPSHOT_ID"],
        "0c6a3a4e8a0f4c559d835d1f3c7b2a05"
    );
}

#[test]
fn test_image_for_another_job_is_ignored() {
    let other = SnapshotImage {
        job_id: Uuid::new_v4(),
        ..image()
    };
    let store = MemoryStore::new().with_image(other);
    let (_, env) = translate("client", false, &store);

    assert_eq!(env["SCRIPT"], "make test");
    assert_eq!(env["CHANGES_CLIENT_SNAPSHOT_ID"], "");
}

#[test]
fn test_cluster_selection() {
    let (_, commit) = translate("legacy", false, &MemoryStore::new());
    let (_, diff) = translate("legacy", true, &MemoryStore::new());

    assert_eq!(commit["CLUSTER"], "default");
    assert_eq!(diff["CLUSTER"], "diffs");
}

#[test]
fn test_translation_is_idempotent() {
    let store = MemoryStore::new().with_image(image());
    let (first, _) = translate("client", true, &store);
    let (second, _) = translate("client", true, &store);
    assert_eq!(first, second);
}

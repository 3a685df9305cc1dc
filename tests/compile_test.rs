//! Integration tests for build-plan compilation
//!
//! Drives job plans through the library: generic and autogenerated modes,
//! resource rejection, and determinism of the compiled plan.

mod common;

use proptest::prelude::*;
use serde_json::json;

use buildplan::core::command::CommandType;
use buildplan::core::jobplan::JobPlan;
use buildplan::core::store::PlanStore;
use buildplan::infra::memory_store::MemoryStore;

fn job_plan(options: serde_json::Value, step: serde_json::Value) -> JobPlan {
    serde_json::from_value(json!({"options": options, "step": step})).unwrap()
}

fn store_with(config: serde_json::Value) -> MemoryStore {
    let serde_json::Value::Object(config) = config else {
        panic!("expected an object");
    };
    MemoryStore::new().with_project_config(common::context(false).project.id, config)
}

// ============================================
// Generic plans
// ============================================

#[test]
fn test_generic_plan_commands_and_artifacts() {
    let settings = common::settings();
    let plan = job_plan(json!({}), common::generic_step("legacy"));
    let builder = plan.builder(&settings).unwrap();

    let implementation = plan
        .implementation(&builder, &common::context(false), &MemoryStore::new())
        .unwrap()
        .unwrap();

    let types: Vec<CommandType> = implementation
        .commands()
        .iter()
        .map(|c| c.command_type)
        .collect();
    assert_eq!(
        types,
        vec![CommandType::Setup, CommandType::Script, CommandType::Teardown]
    );
    assert!(implementation.artifacts().contains("junit.xml"));
    assert_eq!(implementation.max_executors(), 1);
}

#[test]
fn test_generic_plan_with_too_many_cpus_is_rejected() {
    let settings = common::settings();
    let mut step = common::generic_step("legacy");
    step["mode"]["resources"] = json!({"cpus": 9});
    let plan = job_plan(json!({}), step);
    let builder = plan.builder(&settings).unwrap();

    let implementation = plan
        .implementation(&builder, &common::context(false), &MemoryStore::new())
        .unwrap();
    assert!(implementation.is_none());
}

// ============================================
// Autogenerated plans
// ============================================

#[test]
fn test_autogenerated_plan_from_project_config() {
    let settings = common::settings();
    let plan = job_plan(json!({"bazel.autogenerate": "1"}), common::generic_step("legacy"));
    let builder = plan.builder(&settings).unwrap();
    let store = store_with(common::bazel_config());

    let implementation = plan
        .implementation(&builder, &common::context(false), &store)
        .unwrap()
        .unwrap();

    let commands = implementation.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[0].command_type, CommandType::Setup);
    assert!(commands[0]
        .script
        .contains("--output_user_root=/bazel/root/path --batch version"));
    assert_eq!(
        commands[1].script,
        "sudo mkdir -p /usr/local/encap/\n\
sudo /usr/bin/rsync -a --delete rsync://example.com/encap/package1 rsync://example.com/encap/pkg-2 /usr/local/encap/"
    );
    assert_eq!(commands[2].command_type, CommandType::CollectTargets);
    assert!(commands[2]
        .script
        .contains("echo '//foo/bar/baz/...,//bar/bax/...'"));
    assert!(commands[2].script.contains("exclude_tags='flaky,another_tag'"));
    // 2 cpus on each of 3 executors
    assert!(commands[2].script.contains("\" 6 /bazel/root/path"));

    assert_eq!(implementation.max_executors(), 3);
    assert_eq!(implementation.resources().mem_mb, 1234);
    assert!(implementation.artifacts().is_empty());
    assert_eq!(implementation.artifact_suffix(), ".bazel");
}

#[test]
fn test_autogenerated_plan_with_defaults() {
    let settings = common::settings();
    let plan = job_plan(json!({"bazel.autogenerate": "1"}), common::generic_step("legacy"));
    let builder = plan.builder(&settings).unwrap();
    let store = store_with(json!({"bazel.targets": ["//a/...", "//b/..."]}));

    let implementation = plan
        .implementation(&builder, &common::context(false), &store)
        .unwrap()
        .unwrap();

    let commands = implementation.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[1].script, "sudo mkdir -p /usr/local/encap/");
    assert!(commands[2].script.contains("exclude_tags=''"));
    assert!(commands[2].script.contains("\" 4 /bazel/root/path"));
    let orders: Vec<usize> = commands.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn test_autogenerated_boundary_violations() {
    let settings = common::settings();
    let plan = job_plan(json!({"bazel.autogenerate": "1"}), common::generic_step("legacy"));
    let builder = plan.builder(&settings).unwrap();

    for (key, value) in [
        ("bazel.cpus", 0),
        ("bazel.cpus", 9),
        ("bazel.mem", 1023),
        ("bazel.mem", 16385),
        ("bazel.max-executors", 0),
        ("bazel.max-executors", 11),
    ] {
        let store = store_with(json!({"bazel.targets": ["//a/..."], key: value}));
        let implementation = plan
            .implementation(&builder, &common::context(false), &store)
            .unwrap();
        assert!(implementation.is_none(), "{key}={value} should be rejected");
    }
}

#[test]
fn test_store_is_only_read() {
    let settings = common::settings();
    let plan = job_plan(json!({"bazel.autogenerate": "1"}), common::generic_step("legacy"));
    let builder = plan.builder(&settings).unwrap();
    let store = store_with(common::bazel_config());

    plan.implementation(&builder, &common::context(false), &store)
        .unwrap();
    assert!(store.commands().is_empty());
    assert!(store
        .expected_image(common::context(false).job.id)
        .unwrap()
        .is_none());
}

// ============================================
// Property-Based Tests
// ============================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Compiling identical input twice gives the same plan and fingerprint
    #[test]
    fn prop_compilation_is_deterministic(
        targets in prop::collection::vec("//[a-z]{1,6}/\\.\\.\\.", 1..5),
        cpus in 1i64..=8,
        executors in 1i64..=10,
    ) {
        let settings = common::settings();
        let plan = job_plan(json!({"bazel.autogenerate": "1"}), common::generic_step("legacy"));
        let builder = plan.builder(&settings).unwrap();
        let store = store_with(json!({
            "bazel.targets": targets,
            "bazel.cpus": cpus,
            "bazel.max-executors": executors,
        }));
        let ctx = common::context(false);

        let first = plan.implementation(&builder, &ctx, &store).unwrap().unwrap();
        let second = plan.implementation(&builder, &ctx, &store).unwrap().unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
    }
}

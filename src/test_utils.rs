//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a bazel target pattern (`//pkg/sub/...`)
    pub fn bazel_target() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-z0-9_]{0,7}", 1..4)
            .prop_map(|parts| format!("//{}/...", parts.join("/")))
    }

    /// Generate a test tag
    pub fn exclude_tag() -> impl Strategy<Value = String> {
        "[a-z][a-z_]{0,11}"
    }

    /// Generate a cluster name
    pub fn cluster_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,15}"
    }

    /// Generate a shell script body, possibly multi-line
    pub fn script() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z ./-]{0,20}", 0..4).prop_map(|lines| lines.join("\n"))
    }

    /// Generate a resource request inside the default limits
    /// (16 cpus, 1024..=16384 MiB, 1..=10 executors)
    pub fn valid_resources() -> impl Strategy<Value = (i64, i64, i64)> {
        (1i64..=16, 1024i64..=16384, 1i64..=10)
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_bazel_target_generator(target in bazel_target()) {
            prop_assert!(target.starts_with("//"));
            prop_assert!(target.ends_with("/..."));
            prop_assert!(!target.contains(','));
        }

        #[test]
        fn test_exclude_tag_generator(tag in exclude_tag()) {
            prop_assert!(!tag.is_empty());
            prop_assert!(!tag.contains(','));
        }

        #[test]
        fn test_valid_resources_generator((cpus, mem, executors) in valid_resources()) {
            prop_assert!(cpus > 0);
            prop_assert!((1024..=16384).contains(&mem));
            prop_assert!((1..=10).contains(&executors));
        }
    }
}

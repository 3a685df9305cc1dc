//! Scheduler parameter translation
//!
//! A job step reaches the scheduler as an ordered list of name/value
//! parameters. The base parameters are always sent; the client parameters
//! only when the effective build description uses the client.
//!
//! Translation is a pure function of its input: the same input always gives
//! the same list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::build_desc::{BuildDescription, ClientKeys};
use crate::core::context::{Repository, Source, VcsBackend};
use crate::core::settings::Settings;
use crate::core::snapshot::StepScripts;
use crate::core::vcs::Vcs;

/// Parameter names
pub mod names {
    /// Job step id
    pub const CHANGES_BID: &str = "CHANGES_BID";
    /// Project slug
    pub const CHANGES_PID: &str = "CHANGES_PID";
    /// Clone URL
    pub const REPO_URL: &str = "REPO_URL";
    /// Setup script
    pub const SETUP_SCRIPT: &str = "SETUP_SCRIPT";
    /// Main script
    pub const SCRIPT: &str = "SCRIPT";
    /// Teardown script
    pub const TEARDOWN_SCRIPT: &str = "TEARDOWN_SCRIPT";
    /// Reset script
    pub const RESET_SCRIPT: &str = "RESET_SCRIPT";
    /// VCS backend name
    pub const REPO_VCS: &str = "REPO_VCS";
    /// Cluster
    pub const CLUSTER: &str = "CLUSTER";
    /// Working directory
    pub const WORK_PATH: &str = "WORK_PATH";
    /// Workspace
    pub const C_WORKSPACE: &str = "C_WORKSPACE";
    /// Scheduler command
    pub const JENKINS_COMMAND: &str = "JENKINS_COMMAND";
    /// Client adapter
    pub const CHANGES_CLIENT_ADAPTER: &str = "CHANGES_CLIENT_ADAPTER";
    /// Server API URL
    pub const CHANGES_CLIENT_SERVER: &str = "CHANGES_CLIENT_SERVER";
    /// Snapshot bucket
    pub const CHANGES_CLIENT_SNAPSHOT_BUCKET: &str = "CHANGES_CLIENT_SNAPSHOT_BUCKET";
    /// Snapshot id
    pub const CHANGES_CLIENT_SNAPSHOT_ID: &str = "CHANGES_CLIENT_SNAPSHOT_ID";
    /// LXC pre-launch script
    pub const CHANGES_CLIENT_LXC_PRE_LAUNCH: &str = "CHANGES_CLIENT_LXC_PRE_LAUNCH";
    /// LXC post-launch script
    pub const CHANGES_CLIENT_LXC_POST_LAUNCH: &str = "CHANGES_CLIENT_LXC_POST_LAUNCH";
    /// LXC release
    pub const CHANGES_CLIENT_LXC_RELEASE: &str = "CHANGES_CLIENT_LXC_RELEASE";
}

/// One scheduler parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameter {
    /// Parameter name
    pub name: String,
    /// Parameter value
    pub value: String,
}

impl JobParameter {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Client parameters, sent only for client build types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientParams {
    /// Scheduler command
    pub jenkins_command: String,
    /// Client adapter
    pub adapter: String,
    /// Server API URL
    pub server: String,
    /// Snapshot bucket
    pub snapshot_bucket: String,
    /// Snapshot id, empty when no image is expected
    pub snapshot_id: String,
    /// LXC pre-launch script
    pub lxc_pre_launch: String,
    /// LXC post-launch script
    pub lxc_post_launch: String,
    /// LXC release
    pub lxc_release: String,
}

impl ClientParams {
    /// Client parameters for `keys`
    ///
    /// The LXC values come from `primary` (the builder's own build
    /// description, even when a snapshot switched the effective one) and
    /// fall back to the settings' LXC defaults.
    pub fn new(
        keys: ClientKeys<'_>,
        primary: &BuildDescription,
        settings: &Settings,
        snapshot_id: &str,
    ) -> Self {
        let lxc = &settings.lxc;
        Self {
            jenkins_command: keys.jenkins_command.to_string(),
            adapter: keys.adapter.to_string(),
            server: settings.server_api_url(),
            snapshot_bucket: settings.snapshot_bucket.clone(),
            snapshot_id: snapshot_id.to_string(),
            lxc_pre_launch: primary
                .pre_launch
                .clone()
                .unwrap_or_else(|| lxc.pre_launch.clone()),
            lxc_post_launch: primary
                .post_launch
                .clone()
                .unwrap_or_else(|| lxc.post_launch.clone()),
            lxc_release: primary
                .release
                .clone()
                .unwrap_or_else(|| lxc.release.clone()),
        }
    }
}

/// Everything a translation reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationInput<'a> {
    /// Job step id
    pub jobstep_id: Uuid,
    /// Project slug
    pub project_slug: &'a str,
    /// Clone URL
    pub repo_url: String,
    /// Scripts after overrides and snapshot substitution
    pub scripts: StepScripts<'a>,
    /// Reset script
    pub reset_script: &'a str,
    /// VCS backend
    pub backend: VcsBackend,
    /// Selected cluster
    pub cluster: &'a str,
    /// Working directory
    pub work_path: &'a str,
    /// Workspace
    pub workspace: &'a str,
    /// Client parameters, when the effective build description uses the client
    pub client: Option<ClientParams>,
}

/// Translate a step into its ordered parameter list
pub fn translate(input: &TranslationInput<'_>) -> Vec<JobParameter> {
    let mut params = vec![
        JobParameter::new(names::CHANGES_BID, input.jobstep_id.simple().to_string()),
        JobParameter::new(names::CHANGES_PID, input.project_slug),
        JobParameter::new(names::REPO_URL, input.repo_url.as_str()),
        JobParameter::new(names::SETUP_SCRIPT, input.scripts.setup.as_str()),
        JobParameter::new(names::SCRIPT, input.scripts.script.as_str()),
        JobParameter::new(names::TEARDOWN_SCRIPT, input.scripts.teardown.as_str()),
        JobParameter::new(names::RESET_SCRIPT, input.reset_script),
        JobParameter::new(names::REPO_VCS, input.backend.name()),
        JobParameter::new(names::CLUSTER, input.cluster),
        JobParameter::new(names::WORK_PATH, input.work_path),
        JobParameter::new(names::C_WORKSPACE, input.workspace),
    ];

    if let Some(ref client) = input.client {
        params.extend([
            JobParameter::new(names::JENKINS_COMMAND, client.jenkins_command.as_str()),
            JobParameter::new(names::CHANGES_CLIENT_ADAPTER, client.adapter.as_str()),
            JobParameter::new(names::CHANGES_CLIENT_SERVER, client.server.as_str()),
            JobParameter::new(
                names::CHANGES_CLIENT_SNAPSHOT_BUCKET,
                client.snapshot_bucket.as_str(),
            ),
            JobParameter::new(names::CHANGES_CLIENT_SNAPSHOT_ID, client.snapshot_id.as_str()),
            JobParameter::new(
                names::CHANGES_CLIENT_LXC_PRE_LAUNCH,
                client.lxc_pre_launch.as_str(),
            ),
            JobParameter::new(
                names::CHANGES_CLIENT_LXC_POST_LAUNCH,
                client.lxc_post_launch.as_str(),
            ),
            JobParameter::new(names::CHANGES_CLIENT_LXC_RELEASE, client.lxc_release.as_str()),
        ]);
    }

    params
}

/// Parameters as an environment; a repeated name keeps its last value
pub fn params_to_env(params: &[JobParameter]) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|p| (p.name.clone(), p.value.clone()))
        .collect()
}

/// Cluster a step runs on
///
/// Diff builds go to the diff cluster when one is configured; everything
/// else goes to the primary cluster.
pub fn select_cluster<'a>(primary: &'a str, diff: Option<&'a str>, source: &Source) -> &'a str {
    let cluster = match diff {
        Some(diff) if !source.is_commit() => diff,
        _ => primary,
    };
    tracing::debug!("Selected cluster {cluster}");
    cluster
}

/// Clone URL: the VCS-reported remote when a backend is available,
/// otherwise the stored URL
pub fn repository_url(repository: &Repository, vcs: Option<&dyn Vcs>) -> String {
    let Some(vcs) = vcs else {
        return repository.url.clone();
    };
    match vcs.remote_url() {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(
                "Could not read remote of repository {}, using stored URL: {e}",
                repository.id
            );
            repository.url.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vcs::Revision;
    use crate::error::VcsError;
    use crate::test_utils::generators::{cluster_name, script};
    use proptest::prelude::*;

    struct FixedRemote(Result<&'static str, ()>);

    impl Vcs for FixedRemote {
        fn backend(&self) -> VcsBackend {
            VcsBackend::Git
        }

        fn remote_url(&self) -> Result<String, VcsError> {
            self.0.map(str::to_string).map_err(|()| VcsError::WalkFailed {
                error: "no remote".to_string(),
            })
        }

        fn log(&self, _limit: usize) -> Result<Vec<Revision>, VcsError> {
            Ok(Vec::new())
        }

        fn is_child_parent(&self, _child: &str, _parent: &str) -> Result<bool, VcsError> {
            Ok(false)
        }
    }

    fn input<'a>(desc: &'a BuildDescription, client: Option<ClientParams>) -> TranslationInput<'a> {
        TranslationInput {
            jobstep_id: Uuid::parse_str("6f3e9b2c-1d2a-4c5b-8e7f-0a1b2c3d4e5f").unwrap(),
            project_slug: "server",
            repo_url: "https://example.com/server.git".to_string(),
            scripts: StepScripts {
                build_desc: desc,
                setup: "setup".to_string(),
                script: "make test".to_string(),
                teardown: "teardown".to_string(),
            },
            reset_script: "reset",
            backend: VcsBackend::Git,
            cluster: "default",
            work_path: "src",
            workspace: "ws",
            client,
        }
    }

    fn client_desc() -> BuildDescription {
        BuildDescription {
            uses_client: true,
            jenkins_command: Some("changes-client".to_string()),
            adapter: Some("basic".to_string()),
            ..BuildDescription::default()
        }
    }

    fn names_of(params: &[JobParameter]) -> Vec<&str> {
        params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_base_parameters_in_order() {
        let desc = BuildDescription::default();
        let params = translate(&input(&desc, None));

        assert_eq!(
            names_of(&params),
            vec![
                "CHANGES_BID",
                "CHANGES_PID",
                "REPO_URL",
                "SETUP_SCRIPT",
                "SCRIPT",
                "TEARDOWN_SCRIPT",
                "RESET_SCRIPT",
                "REPO_VCS",
                "CLUSTER",
                "WORK_PATH",
                "C_WORKSPACE",
            ]
        );
        assert_eq!(params[0].value, "6f3e9b2c1d2a4c5b8e7f0a1b2c3d4e5f");
        assert_eq!(params[4].value, "make test");
        assert_eq!(params[7].value, "git");
    }

    #[test]
    fn test_client_parameters_follow_base() {
        let desc = client_desc();
        let settings = Settings::default();
        let keys = desc.client_keys().unwrap();
        let client = ClientParams::new(keys, &desc, &settings, "");
        let params = translate(&input(&desc, Some(client)));

        assert_eq!(params.len(), 19);
        assert_eq!(
            &names_of(&params)[11..],
            &[
                "JENKINS_COMMAND",
                "CHANGES_CLIENT_ADAPTER",
                "CHANGES_CLIENT_SERVER",
                "CHANGES_CLIENT_SNAPSHOT_BUCKET",
                "CHANGES_CLIENT_SNAPSHOT_ID",
                "CHANGES_CLIENT_LXC_PRE_LAUNCH",
                "CHANGES_CLIENT_LXC_POST_LAUNCH",
                "CHANGES_CLIENT_LXC_RELEASE",
            ]
        );
        let env = params_to_env(&params);
        assert_eq!(env["CHANGES_CLIENT_SERVER"], "http://localhost:5000/api/0");
        assert_eq!(env["CHANGES_CLIENT_LXC_RELEASE"], "trusty");
        assert_eq!(env["CHANGES_CLIENT_SNAPSHOT_ID"], "");
    }

    #[test]
    fn test_lxc_values_prefer_primary_description() {
        let mut primary = client_desc();
        primary.release = Some("xenial".to_string());
        primary.pre_launch = Some("pre.sh".to_string());
        let mut settings = Settings::default();
        settings.lxc.post_launch = "post.sh".to_string();

        let keys = primary.client_keys().unwrap();
        let client = ClientParams::new(keys, &primary, &settings, "abc");

        assert_eq!(client.lxc_release, "xenial");
        assert_eq!(client.lxc_pre_launch, "pre.sh");
        assert_eq!(client.lxc_post_launch, "post.sh");
        assert_eq!(client.snapshot_id, "abc");
    }

    #[test]
    fn test_params_to_env_last_value_wins() {
        let params = vec![
            JobParameter::new("A", "1"),
            JobParameter::new("B", "2"),
            JobParameter::new("A", "3"),
        ];
        let env = params_to_env(&params);
        assert_eq!(env.len(), 2);
        assert_eq!(env["A"], "3");
    }

    #[test]
    fn test_select_cluster() {
        let commit = Source {
            revision_sha: "abc".to_string(),
            patch_id: None,
        };
        let diff = Source {
            revision_sha: "abc".to_string(),
            patch_id: Some(Uuid::new_v4()),
        };

        assert_eq!(select_cluster("main", Some("diffs"), &diff), "diffs");
        assert_eq!(select_cluster("main", Some("diffs"), &commit), "main");
        assert_eq!(select_cluster("main", None, &diff), "main");
    }

    #[test]
    fn test_repository_url_prefers_vcs_remote() {
        let repo = Repository {
            id: Uuid::new_v4(),
            url: "https://stored.example.com/repo.git".to_string(),
            backend: VcsBackend::Git,
            local_path: None,
        };

        assert_eq!(repository_url(&repo, None), "https://stored.example.com/repo.git");

        let vcs = FixedRemote(Ok("git@example.com:repo.git"));
        assert_eq!(repository_url(&repo, Some(&vcs)), "git@example.com:repo.git");

        let broken = FixedRemote(Err(()));
        assert_eq!(
            repository_url(&repo, Some(&broken)),
            "https://stored.example.com/repo.git"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Translating the same input twice gives the same parameters
        #[test]
        fn prop_translate_is_idempotent(
            body in script(),
            cluster in cluster_name(),
            snapshot in prop::option::of("[0-9a-f]{32}"),
        ) {
            let desc = client_desc();
            let settings = Settings::default();
            let client = desc
                .client_keys()
                .map(|keys| {
                    ClientParams::new(keys, &desc, &settings, snapshot.as_deref().unwrap_or(""))
                });
            let mut input = input(&desc, client);
            input.scripts.script = body.clone();
            input.cluster = &cluster;

            let first = translate(&input);
            let second = translate(&input);
            prop_assert_eq!(&first, &second);

            let env = params_to_env(&first);
            prop_assert_eq!(&env[names::SCRIPT], &body);
            prop_assert_eq!(&env[names::CLUSTER], &cluster);
        }
    }
}

//! Default configuration values

/// Build type used when neither the step nor the settings name one
pub const DEFAULT_BUILD_TYPE: &str = "legacy";

/// Default server base URL handed to the client as its callback
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// API path appended to the server base URL
pub const API_PATH: &str = "/api/0";

/// Maximum CPUs a single executor may request
pub const MAX_CPUS_PER_EXECUTOR: u32 = 16;

/// Minimum memory (MiB) a single executor may request
pub const MIN_MEM_MB_PER_EXECUTOR: u32 = 1024;

/// Maximum memory (MiB) a single executor may request
pub const MAX_MEM_MB_PER_EXECUTOR: u32 = 16384;

/// Upper bound on executors for one build
pub const MAX_EXECUTORS: u32 = 10;

/// Default LXC release for client builds
pub const DEFAULT_LXC_RELEASE: &str = "trusty";

/// Shell no-op used as the script when a snapshot already satisfies the step
pub const NOOP_SCRIPT: &str = ":";

/// Default CPUs requested per executor
pub const DEFAULT_CPUS: i64 = 4;

/// Default memory (MiB) requested per executor
pub const DEFAULT_MEM_MB: i64 = 8192;

/// Default executor fan-out
pub const DEFAULT_MAX_EXECUTORS: i64 = 1;

/// Artifact suffix reported by autogenerated bazel builds
pub const BAZEL_ARTIFACT_SUFFIX: &str = ".bazel";

/// Plan option that switches a job to the autogenerated bazel mode
pub const AUTOGENERATE_OPTION: &str = "bazel.autogenerate";

/// Local install root for encap dependencies
pub const ENCAP_INSTALL_ROOT: &str = "/usr/local/encap/";

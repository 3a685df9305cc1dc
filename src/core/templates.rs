//! Script templates for autogenerated bazel builds
//!
//! Templates use `{name}` placeholders; `{{` and `}}` render as literal
//! braces. Rendering is a single pass, so values are never re-expanded, and
//! a placeholder without a value is an error rather than an empty string.
//! Identical inputs always render byte-identical scripts.

use regex::Regex;
use std::collections::BTreeMap;

use crate::config::defaults::ENCAP_INSTALL_ROOT;
use crate::core::settings::PackageSettings;
use crate::error::TemplateError;

/// Placeholder values keyed by name
pub type TemplateValues = BTreeMap<&'static str, String>;

/// Executor bootstrap: pins apt sources, installs packages, warms up bazel
pub const BAZEL_SETUP: &str = r#"#!/bin/bash -eux
# Clean up any existing apt sources
sudo rm -rf /etc/apt/sources.list.d
# Overwrite apt sources
echo "{apt_spec}" | sudo tee /etc/apt/sources.list

# apt-get update, and try again if it fails first time
sudo apt-get -y update || sudo apt-get -y update
sudo apt-get install -y --force-yes {bazel_apt_pkgs}

/usr/bin/bazel --nomaster_blazerc --blazerc=/dev/null --output_user_root={bazel_root} --batch version
"#;

/// Creates the encap root; always the first line of the sync command
pub const ENCAP_MKDIR: &str = "sudo mkdir -p {encap_root}";

/// Syncs every encap source into the encap root
pub const ENCAP_RSYNC: &str = "sudo /usr/bin/rsync -a --delete {sources} {encap_root}";

/// Collects test targets and prints the client's test list as JSON
pub const COLLECT_TARGETS: &str = r#"#!/bin/bash -eu
# Clean up any existing apt sources
sudo rm -rf /etc/apt/sources.list.d >/dev/null 2>&1
# Overwrite apt sources
(echo "{apt_spec}" | sudo tee /etc/apt/sources.list) >/dev/null 2>&1

# apt-get update, and try again if it fails first time
(sudo apt-get -y update || sudo apt-get -y update) >/dev/null 2>&1
sudo apt-get install -y --force-yes {bazel_apt_pkgs} python >/dev/null 2>&1

targets="$(echo '{bazel_targets}' | tr ',' ' ')"
exclude_tags='{bazel_exclude_tags}'

query="tests(set($targets))"
if [ -n "$exclude_tags" ]; then
    tag_pattern="$(echo "$exclude_tags" | tr ',' '|')"
    query="$query except attr(tags, '($tag_pattern)', tests(set($targets)))"
fi

/usr/bin/bazel \
    --nomaster_blazerc \
    --blazerc=/dev/null \
    --output_user_root={bazel_root} \
    --batch \
    query "$query" 2>/dev/null | python -c "{script}" {max_jobs} {bazel_root}
"#;

/// Turns `bazel query` output on stdin into the client's JSON test list
///
/// Arguments: max jobs, bazel output root. `{test_names}` is left for the
/// client to expand.
pub const COLLECT_TARGETS_EMITTER: &str = "import json, sys
max_jobs, bazel_root = int(sys.argv[1]), sys.argv[2]
targets = sorted(set(l.strip() for l in sys.stdin if l.strip()))
print(json.dumps({'cmd': '/usr/bin/bazel --nomaster_blazerc --blazerc=/dev/null --output_user_root=%s --batch test --jobs=%d {test_names}' % (bazel_root, max_jobs), 'tests': targets}))";

/// Render `{name}` placeholders from `values`
pub fn render(template: &str, values: &TemplateValues) -> Result<String, TemplateError> {
    let re = Regex::new(r"\{\{|\}\}|\{([a-z_][a-z0-9_]*)\}").map_err(|e| {
        TemplateError::InvalidPattern {
            error: e.to_string(),
        }
    })?;

    let mut last_end = 0;
    let mut output = String::with_capacity(template.len());

    for cap in re.captures_iter(template) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        output.push_str(&template[last_end..full_match.start()]);

        match cap.get(1) {
            Some(name) => {
                let value = values.get(name.as_str()).ok_or_else(|| {
                    TemplateError::MissingValue {
                        name: name.as_str().to_string(),
                    }
                })?;
                output.push_str(value);
            }
            None => output.push_str(&full_match.as_str()[..1]),
        }

        last_end = full_match.end();
    }

    output.push_str(&template[last_end..]);
    Ok(output)
}

/// Bootstrap script for the executor
pub fn bazel_setup_script(packages: &PackageSettings) -> Result<String, TemplateError> {
    let mut values = TemplateValues::new();
    values.insert("apt_spec", packages.apt_spec.clone());
    values.insert("bazel_apt_pkgs", packages.bazel_apt_pkgs.join(" "));
    values.insert("bazel_root", packages.bazel_root_path.clone());

    Ok(render(BAZEL_SETUP, &values)?.trim().to_string())
}

/// Sync script for the encap dependency group
///
/// Sources are listed in declaration order, joined by single spaces. An
/// empty group only creates the encap root.
pub fn encap_sync_script(
    packages: &PackageSettings,
    dependencies: &[String],
) -> Result<String, TemplateError> {
    let mut values = TemplateValues::new();
    values.insert("encap_root", ENCAP_INSTALL_ROOT.to_string());
    values.insert(
        "sources",
        dependencies
            .iter()
            .map(|dep| format!("{}{dep}", packages.encap_rsync_url))
            .collect::<Vec<_>>()
            .join(" "),
    );

    let mut lines = vec![render(ENCAP_MKDIR, &values)?];
    if !dependencies.is_empty() {
        lines.push(render(ENCAP_RSYNC, &values)?);
    }
    Ok(lines.join("\n"))
}

/// Inputs of the collect-targets script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectTargetsArgs {
    /// Apt source line
    pub apt_spec: String,
    /// Apt packages, space separated
    pub bazel_apt_pkgs: String,
    /// Bazel output root
    pub bazel_root: String,
    /// Target patterns, comma separated
    pub bazel_targets: String,
    /// Excluded tags, comma separated (empty for none)
    pub bazel_exclude_tags: String,
    /// Parallel jobs for the whole build
    pub max_jobs: u32,
}

impl CollectTargetsArgs {
    /// Placeholder values for [`COLLECT_TARGETS`]
    pub fn values(&self) -> TemplateValues {
        let mut values = TemplateValues::new();
        values.insert("apt_spec", self.apt_spec.clone());
        values.insert("bazel_apt_pkgs", self.bazel_apt_pkgs.clone());
        values.insert("bazel_root", self.bazel_root.clone());
        values.insert("bazel_targets", self.bazel_targets.clone());
        values.insert("bazel_exclude_tags", self.bazel_exclude_tags.clone());
        values.insert("script", COLLECT_TARGETS_EMITTER.to_string());
        values.insert("max_jobs", self.max_jobs.to_string());
        values
    }

    /// Render the collect-targets script
    pub fn render(&self) -> Result<String, TemplateError> {
        render(COLLECT_TARGETS, &self.values())
    }
}

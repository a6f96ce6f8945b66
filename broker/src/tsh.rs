use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use hopsh_core::InventoryError;
use hopsh_core::InventorySource;
use hopsh_core::Node;
use hopsh_core::PROMOTED_LABEL_KEYS;
use serde::Deserialize;
use tracing::debug;
use tracing::info;

use crate::config::Config;
use crate::error::BrokerError;

/// Inventory source backed by the Teleport `tsh` CLI. Construction runs the
/// authentication handshake (`tsh status`, `tsh env`) so a session that
/// cannot proceed fails before the terminal is taken over.
pub struct TshSource {
    tsh: PathBuf,
    cluster: String,
    region: String,
}

impl TshSource {
    pub fn new(config: &Config) -> Result<Self, BrokerError> {
        let tsh = locate_tsh(config)?;
        let cluster = active_cluster(&tsh)?;
        let region = region_key(&tsh)?;
        info!(cluster = cluster.as_str(), region = region.as_str(), tsh = %tsh.display(), "tsh source ready");
        Ok(Self { tsh, cluster, region })
    }

    pub fn tsh_path(&self) -> &Path {
        &self.tsh
    }
}

#[async_trait]
impl InventorySource for TshSource {
    fn cluster(&self) -> &str {
        &self.cluster
    }

    fn region_key(&self) -> &str {
        &self.region
    }

    async fn fetch(&self, _refresh: bool) -> Result<Vec<Node>, InventoryError> {
        let output = tokio::process::Command::new(&self.tsh)
            .args(["ls", "--format", "json"])
            .output()
            .await
            .map_err(|err| command_failed("tsh ls", &err.to_string()))?;
        if !output.status.success() {
            return Err(command_failed("tsh ls", &combined_text(&output)).into());
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let nodes = parse_nodes(&raw)?;
        debug!(nodes = nodes.len(), "parsed tsh inventory");
        Ok(nodes)
    }
}

fn locate_tsh(config: &Config) -> Result<PathBuf, BrokerError> {
    if let Some(dir) = &config.tsh_path {
        let candidate = dir.join("tsh");
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    which::which("tsh").map_err(|_| BrokerError::TshNotFound)
}

fn active_cluster(tsh: &Path) -> Result<String, BrokerError> {
    let output = std::process::Command::new(tsh)
        .args(["status", "--format=json"])
        .output()
        .map_err(|err| command_failed("tsh status", &err.to_string()))?;
    let text = combined_text(&output);
    if !output.status.success() {
        if text.contains("Not logged in") {
            return Err(BrokerError::NotAuthenticated(text.trim().to_string()));
        }
        return Err(command_failed("tsh status", &text));
    }

    let status: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|err| BrokerError::InvalidOutput {
            command: "tsh status".to_string(),
            message: err.to_string(),
        })?;
    // Even an expired profile is still listed as active here.
    status
        .get("active")
        .and_then(|active| active.get("cluster"))
        .and_then(|cluster| cluster.as_str())
        .map(str::to_string)
        .ok_or(BrokerError::NoActiveProfile)
}

/// The region key is the proxy-host prefix before `-access`, read from
/// `TELEPORT_PROXY` in the `tsh env` output.
fn region_key(tsh: &Path) -> Result<String, BrokerError> {
    let output = std::process::Command::new(tsh)
        .arg("env")
        .output()
        .map_err(|err| command_failed("tsh env", &err.to_string()))?;
    if !output.status.success() {
        return Err(command_failed("tsh env", &combined_text(&output)));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let proxy = tsh_env_var(&text, "TELEPORT_PROXY").ok_or_else(|| BrokerError::InvalidOutput {
        command: "tsh env".to_string(),
        message: "TELEPORT_PROXY not found".to_string(),
    })?;
    region_from_proxy(&proxy)
}

fn tsh_env_var(env_output: &str, name: &str) -> Option<String> {
    env_output.split_whitespace().find_map(|entry| {
        let (key, value) = entry.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn region_from_proxy(proxy: &str) -> Result<String, BrokerError> {
    match proxy.split_once("-access") {
        Some((prefix, _)) if !prefix.is_empty() => Ok(prefix.to_string()),
        _ => Err(BrokerError::InvalidProxy(proxy.to_string())),
    }
}

fn command_failed(command: &str, message: &str) -> BrokerError {
    BrokerError::CommandFailed {
        command: command.to_string(),
        message: message.trim().to_string(),
    }
}

fn combined_text(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItem {
    kind: String,
    metadata: RawMetadata,
    spec: RawSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSpec {
    hostname: String,
    cmd_labels: RawCmdLabels,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCmdLabels {
    ip: RawResult,
    os: RawResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResult {
    result: String,
}

/// Map `tsh ls --format json` output to nodes: entries of kind `node` only,
/// with the `region`/`env`/`category3` labels promoted to fixed fields and
/// removed from the label map.
pub fn parse_nodes(raw: &str) -> Result<Vec<Node>, BrokerError> {
    let json = strip_invalid_json_prefix(raw);
    let items: Vec<RawItem> =
        serde_json::from_str(json).map_err(|err| BrokerError::InvalidOutput {
            command: "tsh ls".to_string(),
            message: err.to_string(),
        })?;

    Ok(items
        .into_iter()
        .filter(|item| item.kind == "node")
        .map(|item| {
            let mut labels = item.metadata.labels;
            let region = labels.get("region").cloned().unwrap_or_default();
            let env = labels.get("env").cloned().unwrap_or_default();
            let node_type = labels.get("category3").cloned().unwrap_or_default();
            for key in PROMOTED_LABEL_KEYS {
                labels.remove(key);
            }
            Node {
                hostname: item.spec.hostname,
                ip: item.spec.cmd_labels.ip.result,
                os: item.spec.cmd_labels.os.result,
                region,
                env,
                node_type,
                labels,
            }
        })
        .collect())
}

/// `tsh ls` may print a re-login banner before the JSON document; scan
/// forward to the first position where the remainder is valid JSON.
pub fn strip_invalid_json_prefix(data: &str) -> &str {
    for (idx, ch) in data.char_indices() {
        if ch != '[' && ch != '{' {
            continue;
        }
        let rest = &data[idx..];
        if serde_json::from_str::<serde::de::IgnoredAny>(rest).is_ok() {
            return rest;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LS_JSON: &str = r#"[
        {
            "kind": "node",
            "metadata": {
                "labels": {
                    "region": "kr",
                    "env": "dev",
                    "category3": "compute",
                    "team": "payments"
                }
            },
            "spec": {
                "hostname": "web-1",
                "cmd_labels": {
                    "ip": {"result": "10.0.0.1"},
                    "os": {"result": "Ubuntu 22.04"}
                }
            }
        },
        {
            "kind": "app",
            "metadata": {"labels": {}},
            "spec": {"hostname": "ignored"}
        }
    ]"#;

    #[test]
    fn parses_nodes_and_promotes_labels() {
        let nodes = parse_nodes(LS_JSON).expect("parse");

        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node.hostname, "web-1");
        assert_eq!(node.ip, "10.0.0.1");
        assert_eq!(node.os, "Ubuntu 22.04");
        assert_eq!(node.region, "kr");
        assert_eq!(node.env, "dev");
        assert_eq!(node.node_type, "compute");
        assert_eq!(node.labels.len(), 1);
        assert_eq!(node.label("team"), "payments");
    }

    #[test]
    fn strips_relogin_banner_before_json() {
        let noisy = format!("Re-login to cluster...\nProfile refreshed.\n{LS_JSON}");
        let nodes = parse_nodes(&noisy).expect("parse");
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn prefix_stripping_skips_braces_inside_the_banner() {
        let noisy = format!("warning {{unbalanced\n{LS_JSON}");
        assert_eq!(strip_invalid_json_prefix(&noisy), LS_JSON);
    }

    #[test]
    fn garbage_without_json_is_an_error() {
        let err = parse_nodes("no json here").expect_err("should fail");
        assert!(matches!(err, BrokerError::InvalidOutput { .. }));
    }

    #[test]
    fn parses_tsh_env_output() {
        let output = "TELEPORT_PROXY=lab-eu-access.example.com:443\nTELEPORT_CLUSTER=lab-eu\n";
        assert_eq!(
            tsh_env_var(output, "TELEPORT_PROXY"),
            Some("lab-eu-access.example.com:443".to_string())
        );
        assert_eq!(tsh_env_var(output, "TELEPORT_AUTH"), None);
    }

    #[test]
    fn region_is_the_proxy_prefix_before_access() {
        assert_eq!(
            region_from_proxy("lab-eu-access.example.com:443").expect("region"),
            "lab-eu"
        );
        assert!(matches!(
            region_from_proxy("proxy.example.com"),
            Err(BrokerError::InvalidProxy(_))
        ));
    }
}

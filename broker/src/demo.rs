use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use hopsh_core::InventoryError;
use hopsh_core::InventorySource;
use hopsh_core::Node;

/// Canned inventory used when `HOPSH_DEMO` is set, so the browser can be
/// exercised without a Teleport cluster. Fetch delays briefly to mimic a
/// slow initial acquisition.
pub struct DemoSource;

const DEMO_FETCH_DELAY: Duration = Duration::from_secs(2);

#[async_trait]
impl InventorySource for DemoSource {
    fn cluster(&self) -> &str {
        "demo-cluster"
    }

    fn region_key(&self) -> &str {
        "demo"
    }

    async fn fetch(&self, _refresh: bool) -> Result<Vec<Node>, InventoryError> {
        tokio::time::sleep(DEMO_FETCH_DELAY).await;
        Ok(demo_nodes())
    }
}

fn demo_node(index: u32, os: &str, team: &str, az: &str) -> Node {
    Node {
        hostname: format!("host{index}.example.com"),
        ip: format!("192.168.1.{index}"),
        os: os.to_string(),
        labels: BTreeMap::from([
            ("Team".to_string(), team.to_string()),
            ("AZ".to_string(), az.to_string()),
        ]),
        ..Default::default()
    }
}

pub fn demo_nodes() -> Vec<Node> {
    vec![
        demo_node(1, "Ubuntu 22.04", "dev", "us-east-1a"),
        demo_node(2, "Ubuntu 22.04", "dev", "us-east-1b"),
        demo_node(3, "Ubuntu 22.04", "dev", "us-east-1b"),
        demo_node(4, "CentOS Stream", "infra", "us-east-1b"),
        demo_node(5, "CentOS Stream", "infra", "us-east-1a"),
        demo_node(6, "NixOS 23.11", "infra", "us-east-1c"),
        demo_node(7, "NixOS 23.11", "infra", "us-east-1c"),
        demo_node(8, "Rocky Linux 9", "dev", "us-east-1a"),
    ]
}

use anyhow::Context;
use clap::Parser;
use log::info;

use testbed_node::config::{NodeArgs, NodeConfig};
use testbed_node::testbed::TestbedNode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = NodeConfig::try_from(NodeArgs::parse()).context("invalid configuration")?;

    let node = TestbedNode::bind(&config)
        .await
        .context("cannot start testbed node")?;
    info!(
        "Testbed node serving on {:?}",
        node.local_endpoint().unwrap_or(config.bind)
    );

    node.run().await?;
    Ok(())
}

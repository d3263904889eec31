//! Routes requester IPs to service instances while the fleet changes.
//!
//! Run with `RUST_LOG=debug` to also see ring mutations, or `trace` for every
//! routing decision.

use {
    std::{borrow::Cow, fmt},
    tracing::info,
    tracing_subscriber::EnvFilter,
    vnode_router::{ConsistentHashRouter, Result, RingNode},
};

/// A service instance in a given data center.
#[derive(Debug, Clone)]
struct ServiceNode {
    idc: String,
    ip: String,
    port: u16,
}

impl ServiceNode {
    fn new(idc: &str, ip: &str, port: u16) -> Self {
        Self {
            idc: idc.to_owned(),
            ip: ip.to_owned(),
            port,
        }
    }
}

impl RingNode for ServiceNode {
    fn key(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}-{}:{}", self.idc, self.ip, self.port))
    }
}

impl fmt::Display for ServiceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

fn route_all(router: &ConsistentHashRouter<ServiceNode>, requesters: &[&str]) {
    for ip in requesters {
        match router.route_node(ip) {
            Some(token) => info!(requester = ip, service = %token.node(), "routed"),
            None => info!(requester = ip, "no service available"),
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let node3 = ServiceNode::new("IDC1", "127.0.0.1", 8082);
    let fleet = vec![
        ServiceNode::new("IDC1", "127.0.0.1", 8080),
        ServiceNode::new("IDC1", "127.0.0.1", 8081),
        node3.clone(),
        ServiceNode::new("IDC1", "127.0.0.1", 8084),
    ];
    let mut router = ConsistentHashRouter::new(fleet, 10)?;

    let requesters = [
        "192.168.0.1",
        "192.168.0.2",
        "192.168.0.3",
        "192.168.0.4",
        "192.168.0.5",
    ];
    route_all(&router, &requesters);

    let node5 = ServiceNode::new("IDC2", "127.0.0.1", 8080);
    info!(service = %node5, "putting new service online");
    router.add_node(node5, 10)?;
    route_all(&router, &requesters);

    info!(service = %node3, "taking service offline");
    router.remove_node(&node3);
    route_all(&router, &requesters);

    Ok(())
}

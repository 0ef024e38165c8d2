use crate::kernel::Plugin;
use axum::{Extension, Json, Router, routing::get};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub local_ip: String,
    pub port: u16,
}

/// First non-loopback IPv4 address among `addrs`, or `localhost`.
pub fn first_lan_ipv4<I>(addrs: I) -> String
where
    I: IntoIterator<Item = IpAddr>,
{
    addrs
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "localhost".to_string())
}

/// First non-loopback IPv4 interface address of this host, or `localhost`.
pub fn local_ip() -> String {
    match if_addrs::get_if_addrs() {
        Ok(ifaces) => first_lan_ipv4(ifaces.iter().map(|iface| iface.ip())),
        Err(e) => {
            tracing::warn!(error = %e, "could not list network interfaces");
            "localhost".to_string()
        }
    }
}

/// Tells the admin front-end where the API can be reached on the network.
pub struct InfoPlugin {
    pub info: Arc<ServerInfo>,
}

impl InfoPlugin {
    pub fn new(port: u16) -> Self {
        Self::with_ip(local_ip(), port)
    }

    pub fn with_ip(local_ip: impl Into<String>, port: u16) -> Self {
        Self { info: Arc::new(ServerInfo { local_ip: local_ip.into(), port }) }
    }

    pub fn local_ip(&self) -> &str {
        &self.info.local_ip
    }
}

async fn info_handler(Extension(info): Extension<Arc<ServerInfo>>) -> Json<ServerInfo> {
    Json(info.as_ref().clone())
}

#[async_trait::async_trait]
impl Plugin for InfoPlugin {
    async fn router(&self) -> Router {
        Router::new()
            .route("/", get(info_handler))
            .layer(Extension(self.info.clone()))
    }

    fn name(&self) -> &'static str { "api/info" }
}

#[cfg(test)]
mod tests {
    use super::first_lan_ipv4;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    #[test]
    fn picks_first_lan_ipv4() {
        let addrs = [
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
        ];
        assert_eq!(first_lan_ipv4(addrs), "192.168.1.20");
    }

    #[test]
    fn falls_back_to_localhost() {
        assert_eq!(first_lan_ipv4(Vec::<IpAddr>::new()), "localhost");
        assert_eq!(first_lan_ipv4([IpAddr::V4(Ipv4Addr::LOCALHOST), IpAddr::V6(Ipv6Addr::LOCALHOST)]), "localhost");
    }
}

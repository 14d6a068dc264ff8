//! On-campus detection against the configured campus networks.

use ipnet::IpNet;
use std::net::IpAddr;
use tracing::warn;

use super::Dimension;
use crate::models::{AnalyticsConfig, RequestContext, Scope};

/// Parse a comma separated list of networks ("10.0.0.0/8, 192.168.1.7").
///
/// Bare addresses are treated as single-host networks. Entries that fail to
/// parse are logged and skipped.
pub fn parse_networks(list: &str) -> Vec<IpNet> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<IpAddr>().map(host_network))
                .map_err(|_| warn!("Ignoring invalid campus network '{entry}'"))
                .ok()
        })
        .collect()
}

fn host_network(addr: IpAddr) -> IpNet {
    match addr {
        IpAddr::V4(v4) => IpNet::V4(v4.into()),
        IpAddr::V6(v6) => IpNet::V6(v6.into()),
    }
}

/// Reports the string `"1"` when the remote address falls inside a campus
/// network, so the visit object carries `"dimensionN":"1"` rather than a
/// JSON `true`. Off campus there is no value at all.
#[derive(Debug, Default)]
pub struct IsOnCampus;

impl Dimension for IsOnCampus {
    fn name(&self) -> &'static str {
        "is_on_campus"
    }

    fn scope(&self) -> Scope {
        Scope::Visit
    }

    fn label(&self) -> &'static str {
        "User is on campus"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        let addr = ctx.remote_addr?;
        ctx.on_campus_networks
            .iter()
            .any(|network| network.contains(&addr))
            .then(|| "1".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_from(addr: &str, networks: &str) -> RequestContext {
        RequestContext {
            remote_addr: Some(addr.parse().unwrap()),
            on_campus_networks: parse_networks(networks),
            ..RequestContext::default()
        }
    }

    #[test]
    fn test_parse_networks_accepts_cidrs_and_addresses() {
        let networks = parse_networks("1.2.3.0/24, 10.0.0.0/8,192.168.0.7, nonsense, ");

        assert_eq!(networks.len(), 3);
        assert_eq!(networks[2], "192.168.0.7/32".parse::<IpNet>().unwrap());
    }

    #[test]
    fn test_no_networks_means_no_value() {
        let settings = AnalyticsConfig::default();
        let ctx = ctx_from("1.2.3.4", "");

        assert_eq!(IsOnCampus.value(&ctx, &settings), None);
    }

    #[test]
    fn test_campus_membership() {
        let settings = AnalyticsConfig::default();
        let networks = "1.2.3.0/24, 1.2.5.0/24, 192.168.0.0/16, 10.0.0.0/8";

        for addr in ["1.2.3.4", "1.2.5.4", "10.0.2.153"] {
            assert_eq!(
                IsOnCampus.value(&ctx_from(addr, networks), &settings),
                Some("1".to_string()),
                "{addr} should be on campus"
            );
        }
        assert_eq!(
            IsOnCampus.value(&ctx_from("17.54.23.253", networks), &settings),
            None
        );
    }

    #[test]
    fn test_unknown_remote_address_means_no_value() {
        let settings = AnalyticsConfig::default();
        let mut ctx = ctx_from("1.2.3.4", "1.2.3.0/24");
        ctx.remote_addr = None;

        assert_eq!(IsOnCampus.value(&ctx, &settings), None);
    }
}

use colored::Colorize;
use std::fmt;

use crate::net::{GenNet, IpInfo, Network};

/// Printable facts about a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub network: String,
    pub netmask: String,
    pub broadcast: String,
    pub host_from: String,
    pub host_until: String,
}

impl NetworkInfo {
    pub fn of<Ip: IpInfo>(net: &GenNet<Ip>) -> Self {
        let (host_from, host_until) = net.host();
        NetworkInfo {
            network: net.to_string(),
            netmask: net.subnetmask().to_string(),
            broadcast: net.broadcast_address().to_string(),
            host_from: host_from.to_string(),
            host_until: host_until.to_string(),
        }
    }
}

impl From<&Network> for NetworkInfo {
    fn from(network: &Network) -> Self {
        match network {
            Network::V4(net) => NetworkInfo::of(net),
            Network::V6(net) => NetworkInfo::of(net),
        }
    }
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Network: {}\nNetmask: {}\nBroadcast: {}\nHosts: {} - {}",
            self.network.blue(),
            self.netmask.green(),
            self.broadcast.purple(),
            self.host_from.yellow(),
            self.host_until.yellow()
        )
    }
}

use crate::error::{Error, Result};
use crate::net::{GenNet, IpInfo, Network};
use crate::partition::PartitionPolicy;

pub const WEST: &str = "west";
pub const EAST: &str = "east";

/// The subnet at the position of the first `region` entry in `regions`.
pub fn select_by_region<'a, T, S: AsRef<str>>(
    subnets: &'a [T],
    regions: &[S],
    region: &str,
) -> Result<&'a T> {
    let index = position(regions, region)?;
    subnets.get(index).ok_or(Error::IndexOutOfRange {
        index,
        available: subnets.len(),
    })
}

fn position<S: AsRef<str>>(regions: &[S], region: &str) -> Result<usize> {
    regions
        .iter()
        .position(|r| r.as_ref() == region)
        .ok_or_else(|| Error::UnknownRegion(region.to_owned()))
}

/// How regions are laid out over the subnets of a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionLayout {
    /// Exactly "west" and "east", on blocks 1 and 2 of a four-way split.
    WestEast,
    /// One block per listed region, first and last block left free.
    Ordered(Vec<String>),
}

impl RegionLayout {
    pub fn names(&self) -> Vec<&str> {
        match self {
            RegionLayout::WestEast => vec![WEST, EAST],
            RegionLayout::Ordered(regions) => regions.iter().map(String::as_str).collect(),
        }
    }

    pub fn policy(&self) -> PartitionPolicy {
        match self {
            RegionLayout::WestEast => PartitionPolicy::WEST_EAST,
            RegionLayout::Ordered(_) => PartitionPolicy::ORDERED,
        }
    }

    /// The subnet of `network` assigned to `region`.
    pub fn subnet_for<Ip: IpInfo>(&self, network: &GenNet<Ip>, region: &str) -> Result<GenNet<Ip>> {
        let names = self.names();
        let subnets = self.policy().partition(network, names.len())?;
        let subnet = select_by_region(&subnets, &names, region).copied()?;
        log::info!("region {} of {} is {}", region, network, subnet);
        Ok(subnet)
    }

    pub fn network_for(&self, network: &Network, region: &str) -> Result<Network> {
        match network {
            Network::V4(net) => self.subnet_for(net, region).map(Network::V4),
            Network::V6(net) => self.subnet_for(net, region).map(Network::V6),
        }
    }
}

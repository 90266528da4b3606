pub mod cli;
pub mod error;
pub mod info;
pub mod net;
pub mod partition;
pub mod region;

pub use error::{Error, Result};
pub use net::Network;
pub use partition::{derive_prefix, PartitionPolicy, TotalPartitions};
pub use region::{select_by_region, RegionLayout};

use cli::Command;
use info::NetworkInfo;

/// Runs one command and returns the line to print.
pub fn run(command: Command) -> Result<String> {
    match command {
        Command::LastHostIp { network } => {
            let network: Network = network.parse()?;
            Ok(network.last_host()?.to_string())
        }
        Command::SmallerSubnets { network, region } => {
            region_subnet(RegionLayout::WestEast, &network, &region)
        }
        Command::Subnets {
            network,
            region,
            regions,
        } => region_subnet(RegionLayout::Ordered(regions), &network, &region),
        Command::Info { network } => {
            let network: Network = network.parse()?;
            Ok(NetworkInfo::from(&network).to_string())
        }
    }
}

fn region_subnet(layout: RegionLayout, network: &str, region: &str) -> Result<String> {
    // the region is checked before the network is even parsed
    let names = layout.names();
    if !names.contains(&region) {
        return Err(Error::UnknownRegion(region.to_owned()));
    }

    let network: Network = network.parse()?;
    log::debug!("{} regions {:?} over {}", names.len(), names, network);
    Ok(layout.network_for(&network, region)?.to_string())
}

use clap::ArgAction;

/// Subnet ranges for provisioning per-region cluster networks
#[derive(clap::Parser, Debug)]
#[command(name = "subnet-finder", author, version, about, long_about = None)]
pub struct Cli {
    /// Log more to stderr (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

// a repeated flag replaces its earlier value, `--regions` included
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the last host address (broadcast address minus one) of a network
    #[command(args_override_self = true)]
    LastHostIp {
        /// The network address in CIDR notation (e.g., 172.18.0.0/18)
        #[arg(long)]
        network: String,
    },
    /// Pick the west or east subnet out of a four-way split of a network
    #[command(args_override_self = true)]
    SmallerSubnets {
        /// The network address in CIDR notation (e.g., 172.18.0.0/16)
        #[arg(long)]
        network: String,
        /// The k8s cluster region: west or east
        #[arg(long)]
        region: String,
    },
    /// Pick the subnet of a region by its position in a list of regions
    #[command(args_override_self = true)]
    Subnets {
        /// The network address in CIDR notation (e.g., 172.18.0.0/16)
        #[arg(long)]
        network: String,
        /// The k8s cluster region (e.g., west, east, etc.)
        #[arg(long)]
        region: String,
        /// Ordered list of regions (e.g., west east central, or west,east,central)
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',', action = ArgAction::Set)]
        regions: Vec<String>,
    },
    /// Describe a network: address, netmask, broadcast and host range
    #[command(args_override_self = true)]
    Info {
        /// The network address in CIDR notation (e.g., 172.18.0.0/16)
        #[arg(long)]
        network: String,
    },
}

impl Cli {
    /// Log filter used when RUST_LOG is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

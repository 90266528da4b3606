//! Splitting a network into equal subnets while keeping reserved blocks free.
//!
//! A [`PartitionPolicy`] decides how many blocks the parent is cut into and how
//! many of them, at the start and at the end, belong to other allocations.

use crate::error::{Error, Result};
use crate::net::{GenNet, IpInfo};

/// Smallest prefix, not shorter than `parent_prefix`, that yields at least
/// `required` equal subnets.
pub fn derive_prefix(parent_prefix: u8, max_prefix: u8, required: u128) -> Result<u8> {
    let bits_needed = if required <= 1 {
        0
    } else {
        u128::BITS - (required - 1).leading_zeros()
    };

    let new_prefix = u32::from(parent_prefix) + bits_needed;
    if new_prefix > u32::from(max_prefix) {
        return Err(Error::AddressSpaceExhausted {
            required,
            prefix: parent_prefix,
            max_prefix,
        });
    }

    // bounded by max_prefix above
    Ok(new_prefix as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalPartitions {
    /// Always cut into this many blocks.
    Fixed(usize),
    /// Usable blocks plus every reserved block.
    WithReserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPolicy {
    pub reserve_leading: usize,
    pub reserve_trailing: usize,
    pub total: TotalPartitions,
}

impl PartitionPolicy {
    /// Four-way split, the first block reserved; blocks 1 and 2 are handed out.
    pub const WEST_EAST: PartitionPolicy = PartitionPolicy {
        reserve_leading: 1,
        reserve_trailing: 0,
        total: TotalPartitions::Fixed(4),
    };

    /// `n + 2` blocks, the first and the last reserved.
    pub const ORDERED: PartitionPolicy = PartitionPolicy {
        reserve_leading: 1,
        reserve_trailing: 1,
        total: TotalPartitions::WithReserved,
    };

    pub fn reserved(&self) -> usize {
        self.reserve_leading.saturating_add(self.reserve_trailing)
    }

    pub fn total_partitions(&self, usable: usize) -> usize {
        match self.total {
            TotalPartitions::Fixed(total) => total,
            TotalPartitions::WithReserved => usable.saturating_add(self.reserved()),
        }
    }

    /// Exactly `usable` subnets of `network`, in address order, none of them
    /// a reserved block.
    pub fn partition<Ip: IpInfo>(
        &self,
        network: &GenNet<Ip>,
        usable: usize,
    ) -> Result<Vec<GenNet<Ip>>> {
        if usable == 0 {
            return Err(Error::NoPartitions);
        }

        let total = self.total_partitions(usable);
        let prefix = derive_prefix(network.cidr(), Ip::MAX_PREFIX, total as u128)?;
        log::debug!(
            "splitting {} into {} x /{} ({} leading, {} trailing reserved)",
            network,
            total,
            prefix,
            self.reserve_leading,
            self.reserve_trailing
        );

        let blocks: Vec<GenNet<Ip>> = network.subnets(prefix)?.take(total).collect();
        let available = blocks.len().saturating_sub(self.reserved());
        if available < usable {
            return Err(Error::InsufficientSubnets {
                network: network.to_string(),
                required: usable,
                available,
                reserved: self.reserved(),
            });
        }

        Ok(blocks
            .into_iter()
            .skip(self.reserve_leading)
            .take(usable)
            .collect())
    }
}

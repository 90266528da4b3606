use lazy_static::lazy_static;
use num::{CheckedAdd, CheckedSub, PrimInt};
use regex::Regex;
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use crate::error::{Error, Result};

pub trait IpByteTypeHelper {
    const MAX: Self;
    const BITS: u8;
    const ONE: Self;
    const ZERO: Self;
}

impl IpByteTypeHelper for u32 {
    const MAX: u32 = u32::MAX;
    const BITS: u8 = u32::BITS as u8;
    const ONE: u32 = 1u32;
    const ZERO: u32 = 0u32;
}

impl IpByteTypeHelper for u128 {
    const MAX: u128 = u128::MAX;
    const BITS: u8 = u128::BITS as u8;
    const ONE: u128 = 1u128;
    const ZERO: u128 = 0u128;
}

pub trait IpByteType: IpByteTypeHelper + num::PrimInt + num::Unsigned + Hash + Debug {}
impl<T> IpByteType for T where T: IpByteTypeHelper + num::PrimInt + num::Unsigned + Hash + Debug {}

pub trait IpTrait<Bits: IpByteType> {
    fn from_proxy(bits: Bits) -> Self;
    fn bits(&self) -> Bits;
}

impl IpTrait<u32> for Ipv4Addr {
    fn from_proxy(bits: u32) -> Self {
        Ipv4Addr::from(bits)
    }

    fn bits(&self) -> u32 {
        u32::from(*self)
    }
}

impl IpTrait<u128> for Ipv6Addr {
    fn from_proxy(bits: u128) -> Self {
        Ipv6Addr::from(bits)
    }

    fn bits(&self) -> u128 {
        u128::from(*self)
    }
}

/// An address family: its address type, the integer that backs it and its
/// notation rules.
pub trait IpInfo {
    type Bits: IpByteType;
    type IpType: IpTrait<Self::Bits>
        + Copy
        + Eq
        + Ord
        + Hash
        + Debug
        + Display
        + FromStr
        + Into<IpAddr>;

    const NAME: &'static str;
    const MAX_PREFIX: u8;
    /// Whether `addr/netmask` (and `addr/hostmask`) is accepted besides `addr/len`.
    const NETMASK_NOTATION: bool;
    /// Whether an address may carry a `%zone` suffix, which is dropped.
    const ZONE_ID: bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct V4 {}
impl IpInfo for V4 {
    type IpType = Ipv4Addr;
    type Bits = u32;

    const NAME: &'static str = "IPv4";
    const MAX_PREFIX: u8 = <u32 as IpByteTypeHelper>::BITS;
    const NETMASK_NOTATION: bool = true;
    const ZONE_ID: bool = false;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct V6 {}
impl IpInfo for V6 {
    type IpType = Ipv6Addr;
    type Bits = u128;

    const NAME: &'static str = "IPv6";
    const MAX_PREFIX: u8 = <u128 as IpByteTypeHelper>::BITS;
    const NETMASK_NOTATION: bool = false;
    const ZONE_ID: bool = true;
}

pub fn sn_from_cidr_gen_bits<Ip: IpInfo>(cidr: u8) -> Ip::Bits {
    let host_bits = Ip::MAX_PREFIX.saturating_sub(cidr);
    if host_bits >= Ip::MAX_PREFIX {
        Ip::Bits::ZERO
    } else {
        Ip::Bits::MAX << usize::from(host_bits)
    }
}

pub fn sn_from_cidr_gen<Ip: IpInfo>(cidr: u8) -> Ip::IpType {
    Ip::IpType::from_proxy(sn_from_cidr_gen_bits::<Ip>(cidr))
}

pub fn na_from_ip_and_cidr_gen<Ip: IpInfo>(ip: &Ip::IpType, cidr: u8) -> Ip::IpType {
    Ip::IpType::from_proxy(ip.bits() & sn_from_cidr_gen_bits::<Ip>(cidr))
}

pub fn bc_from_ip_and_cidr_gen<Ip: IpInfo>(ip: &Ip::IpType, cidr: u8) -> Ip::IpType {
    Ip::IpType::from_proxy(ip.bits() | !sn_from_cidr_gen_bits::<Ip>(cidr))
}

/// Prefix length of a netmask, or of a hostmask when the value is not a netmask.
fn cidr_from_mask_bits<Ip: IpInfo>(bits: Ip::Bits) -> Option<u8> {
    [bits, !bits].into_iter().find_map(|netmask| {
        let cidr = u8::try_from(netmask.count_ones()).ok()?;
        (sn_from_cidr_gen_bits::<Ip>(cidr) == netmask).then_some(cidr)
    })
}

/// A network of one address family. The stored address is always the network
/// address for `cidr`.
pub struct GenNet<Ip: IpInfo> {
    na: Ip::IpType,
    cidr: u8,
}

pub type NetV4 = GenNet<V4>;
pub type NetV6 = GenNet<V6>;

impl<Ip: IpInfo> GenNet<Ip> {
    /// Builds the network containing `ip`; host bits are cleared.
    pub fn new(ip: Ip::IpType, cidr: u8) -> Result<Self> {
        if cidr > Ip::MAX_PREFIX {
            return Err(Error::InvalidPrefix {
                prefix: cidr,
                min: 0,
                max: Ip::MAX_PREFIX,
            });
        }

        Ok(GenNet {
            na: na_from_ip_and_cidr_gen::<Ip>(&ip, cidr),
            cidr,
        })
    }

    pub fn network_address(&self) -> Ip::IpType {
        self.na
    }

    pub fn network_address_bits(&self) -> Ip::Bits {
        self.na.bits()
    }

    pub fn broadcast_address(&self) -> Ip::IpType {
        bc_from_ip_and_cidr_gen::<Ip>(&self.na, self.cidr)
    }

    pub fn broadcast_address_bits(&self) -> Ip::Bits {
        self.broadcast_address().bits()
    }

    pub fn subnetmask(&self) -> Ip::IpType {
        sn_from_cidr_gen::<Ip>(self.cidr)
    }

    pub fn subnetmask_bits(&self) -> Ip::Bits {
        sn_from_cidr_gen_bits::<Ip>(self.cidr)
    }

    pub fn cidr(&self) -> u8 {
        self.cidr
    }

    pub fn host_bits(&self) -> u8 {
        Ip::MAX_PREFIX - self.cidr
    }

    /// The address right below the broadcast address.
    ///
    /// For a single-address network this lies outside the network. Only the
    /// all-zero address has no predecessor.
    pub fn last_host(&self) -> Result<Ip::IpType> {
        self.broadcast_address_bits()
            .checked_sub(&Ip::Bits::ONE)
            .map(Ip::IpType::from_proxy)
            .ok_or_else(|| Error::NoLastHost(self.to_string()))
    }

    /// First and last usable host. Networks with fewer than two host bits have
    /// no network/broadcast pair to exclude.
    pub fn host(&self) -> (Ip::IpType, Ip::IpType) {
        let na = self.network_address_bits();
        let bc = self.broadcast_address_bits();
        if self.host_bits() < 2 {
            (self.na, Ip::IpType::from_proxy(bc))
        } else {
            (
                Ip::IpType::from_proxy(na + Ip::Bits::ONE),
                Ip::IpType::from_proxy(bc - Ip::Bits::ONE),
            )
        }
    }

    pub fn contains(&self, other: &GenNet<Ip>) -> bool {
        other.cidr >= self.cidr
            && (other.network_address_bits() & self.subnetmask_bits())
                == self.network_address_bits()
    }

    pub fn overlaps(&self, other: &GenNet<Ip>) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// The equal-size children at `new_prefix`, lowest address first.
    pub fn subnets(&self, new_prefix: u8) -> Result<Subnets<Ip>> {
        if new_prefix < self.cidr || new_prefix > Ip::MAX_PREFIX {
            return Err(Error::InvalidPrefix {
                prefix: new_prefix,
                min: self.cidr,
                max: Ip::MAX_PREFIX,
            });
        }

        let host_bits = Ip::MAX_PREFIX - new_prefix;
        let step = if host_bits >= Ip::Bits::BITS {
            Ip::Bits::ZERO
        } else {
            Ip::Bits::ONE << usize::from(host_bits)
        };

        Ok(Subnets {
            next: Some(self.network_address_bits()),
            last: self.broadcast_address_bits() & sn_from_cidr_gen_bits::<Ip>(new_prefix),
            step,
            cidr: new_prefix,
        })
    }
}

pub struct Subnets<Ip: IpInfo> {
    next: Option<Ip::Bits>,
    last: Ip::Bits,
    step: Ip::Bits,
    cidr: u8,
}

impl<Ip: IpInfo> Iterator for Subnets<Ip> {
    type Item = GenNet<Ip>;

    fn next(&mut self) -> Option<GenNet<Ip>> {
        let current = self.next?;
        self.next = if current == self.last {
            None
        } else {
            current.checked_add(&self.step)
        };

        Some(GenNet {
            na: Ip::IpType::from_proxy(current),
            cidr: self.cidr,
        })
    }
}

impl<Ip: IpInfo> Clone for GenNet<Ip> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Ip: IpInfo> Copy for GenNet<Ip> {}

impl<Ip: IpInfo> PartialEq for GenNet<Ip> {
    fn eq(&self, other: &Self) -> bool {
        self.na == other.na && self.cidr == other.cidr
    }
}

impl<Ip: IpInfo> Eq for GenNet<Ip> {}

impl<Ip: IpInfo> Ord for GenNet<Ip> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.na, self.cidr).cmp(&(other.na, other.cidr))
    }
}

impl<Ip: IpInfo> PartialOrd for GenNet<Ip> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Ip: IpInfo> Hash for GenNet<Ip> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.na.hash(state);
        self.cidr.hash(state);
    }
}

impl<Ip: IpInfo> Debug for GenNet<Ip> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenNet")
            .field("family", &Ip::NAME)
            .field("na", &self.na)
            .field("cidr", &self.cidr)
            .finish()
    }
}

impl<Ip: IpInfo> Display for GenNet<Ip> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.na, self.cidr)
    }
}

lazy_static! {
    static ref CIDR_RE: Regex =
        Regex::new(r"^(?P<ip>[^/]+)(?:/(?P<mask>[^/]*))?$").expect("Invalid Regex?");
}

fn parse_mask<Ip: IpInfo>(input: &str, mask: &str) -> Result<u8> {
    if !mask.is_empty() && mask.bytes().all(|b| b.is_ascii_digit()) {
        return match mask.parse::<u8>() {
            Ok(cidr) if cidr <= Ip::MAX_PREFIX => Ok(cidr),
            _ => Err(Error::malformed(
                input,
                format!("'{}' is not a valid {} prefix length", mask, Ip::NAME),
            )),
        };
    }

    if Ip::NETMASK_NOTATION {
        if let Some(cidr) = mask
            .parse::<Ip::IpType>()
            .ok()
            .and_then(|addr| cidr_from_mask_bits::<Ip>(addr.bits()))
        {
            return Ok(cidr);
        }
    }

    Err(Error::malformed(
        input,
        format!("'{}' is not a valid {} netmask", mask, Ip::NAME),
    ))
}

/// Non-strict parsing: `addr`, `addr/len` and, for IPv4, `addr/netmask` or
/// `addr/hostmask`. Set host bits and an IPv6 zone ID are dropped.
impl<Ip: IpInfo> FromStr for GenNet<Ip> {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let caps = CIDR_RE
            .captures(text)
            .ok_or_else(|| Error::malformed(text, "expected <address>[/<prefix>]"))?;

        let ip_text = match (Ip::ZONE_ID, caps["ip"].split_once('%')) {
            (true, Some((addr, zone))) if !zone.is_empty() && !zone.contains('%') => addr,
            _ => &caps["ip"],
        };
        let ip: Ip::IpType = ip_text.parse().map_err(|_| {
            Error::malformed(
                text,
                format!("'{}' does not appear to be an {} address", ip_text, Ip::NAME),
            )
        })?;

        let cidr = match caps.name("mask") {
            Some(mask) => parse_mask::<Ip>(text, mask.as_str())?,
            None => Ip::MAX_PREFIX,
        };

        GenNet::new(ip, cidr).map_err(|e| Error::malformed(text, e.to_string()))
    }
}

/// A network of either family, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    V4(NetV4),
    V6(NetV6),
}

impl Network {
    pub fn last_host(&self) -> Result<IpAddr> {
        match self {
            Network::V4(net) => net.last_host().map(IpAddr::from),
            Network::V6(net) => net.last_host().map(IpAddr::from),
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        if text.contains(':') {
            text.parse().map(Network::V6)
        } else {
            text.parse().map(Network::V4)
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::V4(net) => Display::fmt(net, f),
            Network::V6(net) => Display::fmt(net, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(text: &str) -> NetV4 {
        text.parse().expect("valid IPv4 network")
    }

    #[test]
    fn test_host_bits_are_cleared() {
        let net = v4("172.18.3.7/18");
        assert_eq!(net.network_address(), Ipv4Addr::new(172, 18, 0, 0));
        assert_eq!(net.cidr(), 18);
        assert_eq!(net.to_string(), "172.18.0.0/18");
    }

    #[test]
    fn test_bare_address_is_single_host() {
        assert_eq!(v4("10.0.0.1").to_string(), "10.0.0.1/32");
        let net: NetV6 = "2001:db8::1".parse().unwrap();
        assert_eq!(net.to_string(), "2001:db8::1/128");
    }

    #[test]
    fn test_netmask_and_hostmask_notation() {
        assert_eq!(v4("172.18.0.5/255.255.0.0").to_string(), "172.18.0.0/16");
        assert_eq!(v4("10.1.2.3/0.0.255.255").to_string(), "10.1.0.0/16");
        assert_eq!(v4("10.1.2.3/0.0.0.0").to_string(), "0.0.0.0/0");
        assert_eq!(v4("10.1.2.3/255.255.255.255").to_string(), "10.1.2.3/32");
        assert!("10.1.2.3/255.0.255.0".parse::<NetV4>().is_err());
    }

    #[test]
    fn test_prefix_with_leading_zero() {
        assert_eq!(v4("10.0.0.0/08").to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_ipv6_has_no_netmask_notation() {
        let net: NetV6 = "2001:db8::7/32".parse().unwrap();
        assert_eq!(net.to_string(), "2001:db8::/32");
        assert!("2001:db8::/ffff:ffff::".parse::<NetV6>().is_err());
    }

    #[test]
    fn test_ipv6_zone_id_is_dropped() {
        let net: Network = "fe80::1%eth0/64".parse().unwrap();
        assert_eq!(net.to_string(), "fe80::/64");
        assert_eq!(
            net.last_host().unwrap().to_string(),
            "fe80::ffff:ffff:ffff:fffe"
        );
        assert!("fe80::1%/64".parse::<NetV6>().is_err());
        assert!("fe80::1%a%b/64".parse::<NetV6>().is_err());
        assert!("10.0.0.1%eth0/8".parse::<NetV4>().is_err());
    }

    #[test]
    fn test_malformed_networks() {
        for input in [
            "not-an-ip",
            "",
            "10.0.0.0/33",
            "10.0.0.0/",
            "10.0.0.0/8/8",
            "10.0.0.0/-1",
            "256.0.0.0/8",
            " 10.0.0.0/8",
            "010.0.0.0/8",
        ] {
            match input.parse::<Network>() {
                Err(Error::MalformedNetwork { input: got, .. }) => assert_eq!(got, input),
                other => panic!("{:?} parsed as {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_network_picks_family() {
        assert!(matches!("10.0.0.0/8".parse::<Network>(), Ok(Network::V4(_))));
        assert!(matches!("fd00::/8".parse::<Network>(), Ok(Network::V6(_))));
    }

    #[test]
    fn test_broadcast_and_last_host() {
        let net = v4("172.18.0.0/18");
        assert_eq!(net.broadcast_address(), Ipv4Addr::new(172, 18, 63, 255));
        assert_eq!(net.last_host().unwrap(), Ipv4Addr::new(172, 18, 63, 254));
        assert_eq!(net.subnetmask(), Ipv4Addr::new(255, 255, 192, 0));
    }

    #[test]
    fn test_last_host_of_single_address() {
        assert_eq!(
            v4("10.0.0.5/32").last_host().unwrap(),
            Ipv4Addr::new(10, 0, 0, 4)
        );
        assert_eq!(
            v4("0.0.0.0/32").last_host(),
            Err(Error::NoLastHost("0.0.0.0/32".to_owned()))
        );
    }

    #[test]
    fn test_last_host_ipv6() {
        let net: Network = "fd00::/64".parse().unwrap();
        assert_eq!(
            net.last_host().unwrap().to_string(),
            "fd00::ffff:ffff:ffff:fffe"
        );
    }

    #[test]
    fn test_host_range() {
        let (from, until) = v4("192.168.1.0/24").host();
        assert_eq!(from, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(until, Ipv4Addr::new(192, 168, 1, 254));

        let (from, until) = v4("192.168.1.0/31").host();
        assert_eq!(from, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(until, Ipv4Addr::new(192, 168, 1, 1));
    }

    #[test]
    fn test_subnets_in_address_order() {
        let subnets: Vec<String> = v4("172.18.0.0/16")
            .subnets(18)
            .unwrap()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            subnets,
            [
                "172.18.0.0/18",
                "172.18.64.0/18",
                "172.18.128.0/18",
                "172.18.192.0/18"
            ]
        );
    }

    #[test]
    fn test_subnets_edges_of_address_space() {
        assert_eq!(v4("0.0.0.0/0").subnets(0).unwrap().count(), 1);
        assert_eq!(v4("255.255.255.255/32").subnets(32).unwrap().count(), 1);
        assert_eq!(v4("255.255.255.0/24").subnets(26).unwrap().count(), 4);

        let halves: Vec<String> = "::/0"
            .parse::<NetV6>()
            .unwrap()
            .subnets(1)
            .unwrap()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(halves, ["::/1", "8000::/1"]);
    }

    #[test]
    fn test_subnets_rejects_prefix_outside_range() {
        let net = v4("10.0.0.0/16");
        assert!(matches!(net.subnets(15), Err(Error::InvalidPrefix { .. })));
        assert!(matches!(net.subnets(33), Err(Error::InvalidPrefix { .. })));
    }

    #[test]
    fn test_contains_and_overlaps() {
        let parent = v4("10.0.0.0/16");
        let child = v4("10.0.4.0/24");
        let outside = v4("10.1.0.0/24");
        assert!(parent.contains(&child));
        assert!(!child.contains(&parent));
        assert!(child.overlaps(&parent));
        assert!(!parent.overlaps(&outside));
    }
}

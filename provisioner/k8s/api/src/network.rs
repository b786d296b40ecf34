use ipnet::IpNet;
use std::{fmt, str::FromStr};

/// An IP network in CIDR notation, as accepted by a NetworkPolicy `ipBlock`.
///
/// Unlike a bare [`IpNet`], host bits must be zero: `10.0.0.1/8` is rejected so that the
/// rendered policy reads exactly as the network it matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cidr(IpNet);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CidrParseError {
    #[error("not a valid CIDR: {0}")]
    Invalid(String),

    #[error("CIDR {0} has host bits set; did you mean {1}?")]
    HostBitsSet(String, IpNet),
}

// === impl Cidr ===

impl Cidr {
    #[inline]
    pub fn net(&self) -> IpNet {
        self.0
    }

    /// Returns true if `other` lies entirely within this network.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }
}

impl FromStr for Cidr {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net = s
            .trim()
            .parse::<IpNet>()
            .map_err(|_| CidrParseError::Invalid(s.to_string()))?;
        if net.trunc() != net {
            return Err(CidrParseError::HostBitsSet(s.to_string(), net.trunc()));
        }
        Ok(Self(net))
    }
}

impl From<IpNet> for Cidr {
    fn from(net: IpNet) -> Self {
        Self(net.trunc())
    }
}

impl From<Cidr> for IpNet {
    fn from(Cidr(net): Cidr) -> Self {
        net
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

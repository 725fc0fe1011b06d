use std::net::{Ipv4Addr, Ipv6Addr};

use super::error::MalformedHeaderError;

pub struct HeaderReader<'a> {
    data: &'a [u8],
}

impl<'a> HeaderReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), MalformedHeaderError> {
        if self.data.len() < needed {
            return Err(MalformedHeaderError::TooShort {
                needed,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, MalformedHeaderError> {
        self.data
            .get(offset)
            .copied()
            .ok_or(MalformedHeaderError::TooShort {
                needed: offset + 1,
                actual: self.data.len(),
            })
    }

    pub fn read_u16_be(&self, offset: usize) -> Result<u16, MalformedHeaderError> {
        let bytes = self.read_slice(offset..offset + 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_slice(
        &self,
        range: std::ops::Range<usize>,
    ) -> Result<&'a [u8], MalformedHeaderError> {
        self.data
            .get(range.clone())
            .ok_or(MalformedHeaderError::TooShort {
                needed: range.end,
                actual: self.data.len(),
            })
    }

    pub fn read_ipv4_addr(
        &self,
        range: std::ops::Range<usize>,
    ) -> Result<Ipv4Addr, MalformedHeaderError> {
        let bytes = self.read_slice(range)?;
        let octets: [u8; 4] = bytes.try_into().map_err(|_| MalformedHeaderError::TooShort {
            needed: 4,
            actual: bytes.len(),
        })?;
        Ok(Ipv4Addr::from(octets))
    }

    pub fn read_ipv6_addr(
        &self,
        range: std::ops::Range<usize>,
    ) -> Result<Ipv6Addr, MalformedHeaderError> {
        let bytes = self.read_slice(range)?;
        let octets: [u8; 16] = bytes.try_into().map_err(|_| MalformedHeaderError::TooShort {
            needed: 16,
            actual: bytes.len(),
        })?;
        Ok(Ipv6Addr::from(octets))
    }

    /// All bytes from `from` to the end of the frame.
    pub fn rest(&self, from: usize) -> Result<&'a [u8], MalformedHeaderError> {
        self.data
            .get(from..)
            .ok_or(MalformedHeaderError::TooShort {
                needed: from,
                actual: self.data.len(),
            })
    }
}

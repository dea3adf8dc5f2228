// Copyright 2022, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This module defines the identifiers and the radio-level value types shared by the ranging
//! requests, the results and the driver boundary.

use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// The caller-supplied token that groups one batch of ranging configs, or one channel map
/// operation.
pub type RequestId = i32;
/// The handle of the local radio interface.
pub type InterfaceHandle = u32;

/// The 48-bit hardware address of a ranging peer.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Create a MacAddress from its 6 bytes, in transmission order.
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl From<MacAddress> for [u8; 6] {
    fn from(addr: MacAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

/// The ranging mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum RttType {
    /// Only the initiator measures the timestamps.
    OneSided = 1,
    /// Both peers take part in the timestamp exchange (FTM).
    TwoSided = 2,
    /// Two-sided if the peer supports it, one-sided otherwise. Resolved once per session.
    Auto = 3,
}

/// The hint of the peer device type. It doesn't constrain the protocol behavior, except that
/// an access point requires the channel information.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum PeerType {
    Sta = 0,
    Ap = 1,
    P2p = 2,
    Nbd = 3,
    Unspecified = 4,
}

impl PeerType {
    /// Whether ranging with this kind of peer runs in infrastructure mode, which requires the
    /// channel of the peer.
    pub fn requires_channel_info(&self) -> bool {
        matches!(self, Self::Ap)
    }
}

/// The operating width of a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum ChannelWidth {
    #[default]
    Invalid = 0,
    Width20 = 1,
    Width40 = 2,
    Width80 = 3,
    Width160 = 4,
    Width80P80 = 5,
    Width5 = 6,
    Width10 = 7,
}

/// The channel of a peer, passed through to the driver opaquely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelInfo {
    pub width: ChannelWidth,
    /// The primary 20 MHz channel, in MHz.
    pub primary_freq: u32,
    /// The center frequency of the first segment, in MHz.
    pub center_freq0: u32,
    /// The center frequency of the second segment, in MHz. Only valid for 80+80.
    pub center_freq1: u32,
}

impl ChannelInfo {
    /// Create the ChannelInfo of a channel with a single segment.
    pub fn new(width: ChannelWidth, primary_freq: u32, center_freq0: u32) -> Self {
        Self { width, primary_freq, center_freq0, center_freq1: 0 }
    }

    /// Whether the channel carries enough information to tune the radio.
    pub fn is_specified(&self) -> bool {
        if self.width == ChannelWidth::Invalid || self.primary_freq == 0 {
            return false;
        }
        self.width != ChannelWidth::Width80P80 || self.center_freq1 != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum Preamble {
    Ofdm = 0,
    Cck = 1,
    Ht = 2,
    Vht = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum SpatialStreams {
    Nss1x1 = 0,
    Nss2x2 = 1,
    Nss3x3 = 2,
    Nss4x4 = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum RateBandwidth {
    Bw20 = 0,
    Bw40 = 1,
    Bw80 = 2,
    Bw160 = 3,
}

/// The transmit rate of a ranging frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WifiRate {
    pub preamble: Preamble,
    pub nss: SpatialStreams,
    pub bandwidth: RateBandwidth,
    /// The rate code in 0.5 Mbps units for OFDM/CCK, or the MCS index for HT/VHT.
    pub rate_mcs_idx: u8,
    /// The bitrate in units of 100 kbps.
    pub bitrate_100kbps: u32,
}

impl Default for WifiRate {
    fn default() -> Self {
        Self {
            preamble: Preamble::Ofdm,
            nss: SpatialStreams::Nss1x1,
            bandwidth: RateBandwidth::Bw20,
            rate_mcs_idx: 0,
            bitrate_100kbps: 0,
        }
    }
}

impl WifiRate {
    /// Decode the packed rate word reported by the driver.
    ///
    /// Layout, from the LSB: preamble (3 bits), nss (2 bits), bandwidth (3 bits), rate or MCS
    /// index (8 bits), 16 reserved bits. Returns None if a field holds a reserved value.
    pub fn from_packed(word: u32, bitrate_100kbps: u32) -> Option<Self> {
        Some(Self {
            preamble: Preamble::from_u32(word & 0x7)?,
            nss: SpatialStreams::from_u32((word >> 3) & 0x3)?,
            bandwidth: RateBandwidth::from_u32((word >> 5) & 0x7)?,
            rate_mcs_idx: ((word >> 8) & 0xff) as u8,
            bitrate_100kbps,
        })
    }

    /// Encode the rate into the packed word, the inverse of from_packed().
    pub fn to_packed(&self) -> u32 {
        (self.preamble as u32)
            | (self.nss as u32) << 3
            | (self.bandwidth as u32) << 5
            | (self.rate_mcs_idx as u32) << 8
    }
}

/// The static ranging capabilities of a radio interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RttCapabilities {
    pub one_sided_supported: bool,
    pub eleven_v_supported: bool,
    pub ftm_supported: bool,
}

impl RttCapabilities {
    pub fn supports_one_sided(&self) -> bool {
        self.one_sided_supported
    }

    /// Two-sided ranging is carried by either FTM (802.11mc) or 802.11v timing measurement.
    pub fn supports_two_sided(&self) -> bool {
        self.ftm_supported || self.eleven_v_supported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_address_display() {
        let addr = MacAddress::new([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0xff]);
        assert_eq!(addr.to_string(), "00:1a:2b:3c:4d:ff");
        assert_eq!(format!("{addr:?}"), "MacAddress(00:1a:2b:3c:4d:ff)");
    }

    #[test]
    fn test_channel_info_is_specified() {
        assert!(!ChannelInfo::default().is_specified());
        assert!(ChannelInfo::new(ChannelWidth::Width80, 5180, 5210).is_specified());
        assert!(!ChannelInfo::new(ChannelWidth::Width20, 0, 0).is_specified());

        let mut channel = ChannelInfo::new(ChannelWidth::Width80P80, 5180, 5210);
        assert!(!channel.is_specified());
        channel.center_freq1 = 5530;
        assert!(channel.is_specified());
    }

    #[test]
    fn test_wifi_rate_from_packed() {
        // VHT, 2x2, 80 MHz, MCS 9.
        let word = 0x3 | (0x1 << 3) | (0x2 << 5) | (9 << 8);
        let rate = WifiRate::from_packed(word, 8667).unwrap();
        assert_eq!(rate.preamble, Preamble::Vht);
        assert_eq!(rate.nss, SpatialStreams::Nss2x2);
        assert_eq!(rate.bandwidth, RateBandwidth::Bw80);
        assert_eq!(rate.rate_mcs_idx, 9);
        assert_eq!(rate.bitrate_100kbps, 8667);
        assert_eq!(rate.to_packed(), word);

        // The reserved bits are ignored.
        assert_eq!(WifiRate::from_packed(word | 0xffff_0000, 8667), Some(rate));
    }

    #[test]
    fn test_wifi_rate_reserved_values() {
        // Preamble 4..7 is reserved.
        assert!(WifiRate::from_packed(0x4, 0).is_none());
        // Bandwidth 4..7 is reserved.
        assert!(WifiRate::from_packed(0x4 << 5, 0).is_none());
    }

    #[test]
    fn test_capabilities() {
        let caps = RttCapabilities { eleven_v_supported: true, ..Default::default() };
        assert!(caps.supports_two_sided());
        assert!(!caps.supports_one_sided());
        assert!(!RttCapabilities::default().supports_two_sided());
    }
}

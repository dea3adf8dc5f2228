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

//! This module defines the ranging results delivered to the caller, and the raw samples
//! reported by the driver.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::params::rtt_packets::{ChannelInfo, MacAddress, PeerType, RttType, WifiRate};

/// The status of one measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum RttStatus {
    Success = 0,
    /// The generic failure, without a more specific reason.
    Failure = 1,
    NoResponse = 2,
    /// The peer rejected the request.
    Rejected = 3,
    NotScheduledYet = 4,
    /// The timing measurement timed out.
    Timeout = 5,
    /// The target AP is on a different channel than the one in the request.
    ApOnDifferentChannel = 6,
    /// The peer or the local radio lacks the capability.
    NoCapability = 7,
    /// The session was cancelled.
    Aborted = 8,
}

impl RttStatus {
    /// Convert the raw status code reported by the driver. Unknown codes are reported as
    /// the generic failure.
    pub fn from_raw(code: u8) -> Self {
        Self::from_u8(code).unwrap_or(Self::Failure)
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

/// The raw per-measurement sample reported by the driver.
///
/// The driver retries internally according to `num_retries_per_measurement` and reports one
/// sample per logical measurement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    /// The 1-based measurement number, if the driver tracks it. When the driver may reorder
    /// the samples of a continuous session, it must set this field.
    pub measurement_num: Option<u32>,
    /// The raw status code, see RttStatus.
    pub status_code: u8,
    /// The RSSI in 0.5 dB steps, e.g. 143 implies -71.5 dB.
    pub rssi: i32,
    /// The RSSI spread in 0.5 dB steps.
    pub rssi_spread: Option<i32>,
    pub tx_rate: WifiRate,
    pub rtt_ns: i64,
    pub rtt_sd_ns: i64,
    pub rtt_spread_ns: i64,
    pub distance_cm: Option<i32>,
    pub distance_sd_cm: Option<i32>,
    pub distance_spread_cm: Option<i32>,
    /// The time of the measurement, in microseconds since boot.
    pub timestamp_us: u64,
    /// The channel actually used, if it differs from the requested one.
    pub channel: Option<ChannelInfo>,
    /// Whether the peer advertised two-sided support, if known. Only logged: the ranging mode
    /// of a session is resolved once at admission, from DriverGateway::peer_two_sided_hint().
    pub peer_two_sided_hint: Option<bool>,
}

/// The result of one measurement, or the terminal result of an aborted or failed session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RttResult {
    pub addr: MacAddress,
    /// The measurement number, starting from 1.
    pub measurement_num: u32,
    pub status: RttStatus,
    /// The resolved ranging mode of the session.
    pub rtt_type: RttType,
    pub peer_type: PeerType,
    /// The channel actually used.
    pub channel: ChannelInfo,
    /// The RSSI in 0.5 dB steps.
    pub rssi: i32,
    /// The RSSI spread in 0.5 dB steps.
    pub rssi_spread: Option<i32>,
    pub tx_rate: WifiRate,
    /// The round trip time in nanoseconds.
    pub rtt_ns: i64,
    /// The standard deviation of the round trip time in nanoseconds.
    pub rtt_sd_ns: i64,
    /// The difference between the max and the min round trip time, in nanoseconds.
    pub rtt_spread_ns: i64,
    /// The distance estimate in centimeters.
    pub distance_cm: Option<i32>,
    pub distance_sd_cm: Option<i32>,
    pub distance_spread_cm: Option<i32>,
    /// The time of the measurement, in microseconds since boot. Zero when no measurement took
    /// place.
    pub timestamp_us: u64,
}

impl RttResult {
    pub(crate) fn from_sample(
        addr: MacAddress,
        measurement_num: u32,
        sample: &RawSample,
        rtt_type: RttType,
        peer_type: PeerType,
        requested_channel: ChannelInfo,
    ) -> Self {
        Self {
            addr,
            measurement_num,
            status: RttStatus::from_raw(sample.status_code),
            rtt_type,
            peer_type,
            channel: sample.channel.unwrap_or(requested_channel),
            rssi: sample.rssi,
            rssi_spread: sample.rssi_spread,
            tx_rate: sample.tx_rate,
            rtt_ns: sample.rtt_ns,
            rtt_sd_ns: sample.rtt_sd_ns,
            rtt_spread_ns: sample.rtt_spread_ns,
            distance_cm: sample.distance_cm,
            distance_sd_cm: sample.distance_sd_cm,
            distance_spread_cm: sample.distance_spread_cm,
            timestamp_us: sample.timestamp_us,
        }
    }

    /// The result that terminates a session without a measurement.
    pub(crate) fn terminal(
        addr: MacAddress,
        measurement_num: u32,
        status: RttStatus,
        rtt_type: RttType,
        peer_type: PeerType,
        channel: ChannelInfo,
    ) -> Self {
        Self {
            addr,
            measurement_num,
            status,
            rtt_type,
            peer_type,
            channel,
            rssi: 0,
            rssi_spread: None,
            tx_rate: WifiRate::default(),
            rtt_ns: 0,
            rtt_sd_ns: 0,
            rtt_spread_ns: 0,
            distance_cm: None,
            distance_sd_cm: None,
            distance_spread_cm: None,
            timestamp_us: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::params::rtt_packets::ChannelWidth;

    #[test]
    fn test_status_from_raw() {
        assert_eq!(RttStatus::from_raw(0), RttStatus::Success);
        assert_eq!(RttStatus::from_raw(6), RttStatus::ApOnDifferentChannel);
        assert_eq!(RttStatus::from_raw(8), RttStatus::Aborted);
        assert_eq!(RttStatus::from_raw(42), RttStatus::Failure);
    }

    #[test]
    fn test_result_from_sample() {
        let addr = MacAddress::new([1, 2, 3, 4, 5, 6]);
        let requested = ChannelInfo::new(ChannelWidth::Width20, 2412, 2412);
        let used = ChannelInfo::new(ChannelWidth::Width40, 2437, 2447);
        let mut sample = RawSample {
            status_code: RttStatus::Success as u8,
            rssi: 143,
            rtt_ns: 33,
            distance_cm: Some(500),
            timestamp_us: 1_000_000,
            ..Default::default()
        };

        let result =
            RttResult::from_sample(addr, 1, &sample, RttType::TwoSided, PeerType::Sta, requested);
        assert_eq!(result.status, RttStatus::Success);
        assert_eq!(result.channel, requested);
        assert_eq!(result.rssi, 143);
        assert_eq!(result.distance_cm, Some(500));
        assert_eq!(result.timestamp_us, 1_000_000);

        sample.channel = Some(used);
        let result =
            RttResult::from_sample(addr, 2, &sample, RttType::TwoSided, PeerType::Sta, requested);
        assert_eq!(result.channel, used);
        assert_eq!(result.measurement_num, 2);
    }
}

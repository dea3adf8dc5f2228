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

//! This module defines the per-peer ranging configuration.

use crate::params::rtt_packets::{ChannelInfo, MacAddress, PeerType, RttType};
use crate::params::utils::validate;
use crate::utils::{builder_field, getter_field};

// The default value of each parameters.
const DEFAULT_RTT_TYPE: RttType = RttType::Auto;
const DEFAULT_PEER_TYPE: PeerType = PeerType::Unspecified;
const DEFAULT_CONTINUOUS: bool = false;
const DEFAULT_INTERVAL_MS: u32 = 0;
const DEFAULT_NUM_MEASUREMENTS: u32 = 0;
const DEFAULT_NUM_SAMPLES_PER_MEASUREMENT: u8 = 8;
const DEFAULT_NUM_RETRIES_PER_MEASUREMENT: u8 = 0;

const MAX_SAMPLES_PER_MEASUREMENT: u8 = 31;
const MAX_RETRIES_PER_MEASUREMENT: u8 = 3;

/// The ranging configuration of one peer.
///
/// When `continuous` is false, `interval_ms` and `num_measurements` are ignored and exactly
/// one measurement is performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RttConfig {
    addr: MacAddress,
    rtt_type: RttType,
    peer_type: PeerType,
    channel: ChannelInfo,
    continuous: bool,
    interval_ms: u32,
    num_measurements: u32,
    num_samples_per_measurement: u8,
    num_retries_per_measurement: u8,
}

#[allow(missing_docs)]
impl RttConfig {
    getter_field!(addr, MacAddress);
    getter_field!(rtt_type, RttType);
    getter_field!(peer_type, PeerType);
    getter_field!(channel, ChannelInfo);
    getter_field!(continuous, bool);
    getter_field!(interval_ms, u32);
    getter_field!(num_measurements, u32);
    getter_field!(num_samples_per_measurement, u8);
    getter_field!(num_retries_per_measurement, u8);

    /// The number of measurements after which the session is completed.
    pub fn total_measurements(&self) -> u32 {
        if self.continuous {
            self.num_measurements
        } else {
            1
        }
    }

    fn is_valid(&self) -> Option<()> {
        validate(
            (1..=MAX_SAMPLES_PER_MEASUREMENT).contains(&self.num_samples_per_measurement),
            "num_samples_per_measurement should be between 1 to 31",
        )?;
        validate(
            self.num_retries_per_measurement <= MAX_RETRIES_PER_MEASUREMENT,
            "num_retries_per_measurement should be between 0 to 3",
        )?;
        if self.continuous {
            validate(self.interval_ms > 0, "interval_ms should be positive when continuous")?;
            validate(
                self.num_measurements >= 1,
                "num_measurements should be at least 1 when continuous",
            )?;
        }
        Some(())
    }
}

/// The builder of RttConfig.
pub struct RttConfigBuilder {
    addr: Option<MacAddress>,
    rtt_type: RttType,
    peer_type: PeerType,
    channel: ChannelInfo,
    continuous: bool,
    interval_ms: u32,
    num_measurements: u32,
    num_samples_per_measurement: u8,
    num_retries_per_measurement: u8,
}

impl Default for RttConfigBuilder {
    fn default() -> Self {
        Self {
            addr: None,
            rtt_type: DEFAULT_RTT_TYPE,
            peer_type: DEFAULT_PEER_TYPE,
            channel: ChannelInfo::default(),
            continuous: DEFAULT_CONTINUOUS,
            interval_ms: DEFAULT_INTERVAL_MS,
            num_measurements: DEFAULT_NUM_MEASUREMENTS,
            num_samples_per_measurement: DEFAULT_NUM_SAMPLES_PER_MEASUREMENT,
            num_retries_per_measurement: DEFAULT_NUM_RETRIES_PER_MEASUREMENT,
        }
    }
}

#[allow(missing_docs)]
impl RttConfigBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_config(config: &RttConfig) -> Self {
        Self {
            addr: Some(config.addr),
            rtt_type: config.rtt_type,
            peer_type: config.peer_type,
            channel: config.channel,
            continuous: config.continuous,
            interval_ms: config.interval_ms,
            num_measurements: config.num_measurements,
            num_samples_per_measurement: config.num_samples_per_measurement,
            num_retries_per_measurement: config.num_retries_per_measurement,
        }
    }

    pub fn build(&self) -> Option<RttConfig> {
        let config = RttConfig {
            addr: self.addr?,
            rtt_type: self.rtt_type,
            peer_type: self.peer_type,
            channel: self.channel,
            continuous: self.continuous,
            interval_ms: self.interval_ms,
            num_measurements: self.num_measurements,
            num_samples_per_measurement: self.num_samples_per_measurement,
            num_retries_per_measurement: self.num_retries_per_measurement,
        };

        config.is_valid()?;
        Some(config)
    }

    // Generate the setter methods for all the fields.
    builder_field!(addr, MacAddress, Some);
    builder_field!(rtt_type, RttType);
    builder_field!(peer_type, PeerType);
    builder_field!(channel, ChannelInfo);
    builder_field!(continuous, bool);
    builder_field!(interval_ms, u32);
    builder_field!(num_measurements, u32);
    builder_field!(num_samples_per_measurement, u8);
    builder_field!(num_retries_per_measurement, u8);
}

/// The config handed to the driver: the caller's config and the ranging mode it resolved to.
/// The resolved mode is never `RttType::Auto`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRttConfig {
    config: RttConfig,
    rtt_type: RttType,
}

impl ResolvedRttConfig {
    pub(crate) fn new(config: RttConfig, rtt_type: RttType) -> Self {
        debug_assert!(rtt_type != RttType::Auto);
        Self { config, rtt_type }
    }

    getter_field!(config, RttConfig);
    getter_field!(rtt_type, RttType);
}

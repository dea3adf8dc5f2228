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

//! This module defines the channel map advertised by a responder in a neighbor discovery (NBD)
//! cluster.

/// The maximum number of windows in a channel map.
pub const MAX_CHANNEL_MAP_WINDOWS: usize = 32;
/// The interval between two discovery windows (broadcast windows), in time units (TU).
pub const DISCOVERY_WINDOW_INTERVAL_TU: u32 = 512;

/// One window slot of the channel map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelMapWindow {
    /// The channel frequency in MHz. Zero means the firmware is free to pick the channel.
    pub channel_mhz: u32,
    /// The duration of the slot, in broadcast-window units.
    pub duration: u32,
}

impl ChannelMapWindow {
    pub fn new(channel_mhz: u32, duration: u32) -> Self {
        Self { channel_mhz, duration }
    }

    pub fn is_unspecified(&self) -> bool {
        self.channel_mhz == 0
    }
}

/// The ordered channel availability of the responder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelMap {
    pub windows: Vec<ChannelMapWindow>,
}

impl ChannelMap {
    pub fn new(windows: Vec<ChannelMapWindow>) -> Self {
        Self { windows }
    }

    /// Whether the map holds between 1 and MAX_CHANNEL_MAP_WINDOWS windows.
    pub fn is_valid(&self) -> bool {
        (1..=MAX_CHANNEL_MAP_WINDOWS).contains(&self.windows.len())
    }
}

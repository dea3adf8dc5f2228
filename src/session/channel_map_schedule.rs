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

//! This module defines the NBD channel map broadcast schedule of one radio interface.

use crate::params::channel_map_params::{ChannelMap, DISCOVERY_WINDOW_INTERVAL_TU};
use crate::params::rtt_packets::RequestId;
use crate::utils::getter_field;

/// The externally visible status of a channel map schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMapStatus {
    /// The identifier of the publish request.
    pub request_id: RequestId,
    /// The advertised channel map.
    pub channel_map: ChannelMap,
    /// The number of broadcast windows left before the schedule expires.
    pub remaining_dw: u32,
    /// The number of broadcast windows already advertised.
    pub elapsed_dw: u32,
    /// Whether a clear request takes effect at the next broadcast window.
    pub clear_pending: bool,
}

impl ChannelMapStatus {
    /// The time left before the schedule expires, in time units (TU).
    pub fn remaining_tu(&self) -> u64 {
        self.remaining_dw as u64 * DISCOVERY_WINDOW_INTERVAL_TU as u64
    }
}

/// What happened to the schedule at a broadcast window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// The schedule is still advertised.
    Advertising,
    /// The countdown reached zero. The schedule should be destroyed and the driver stopped.
    Expired,
    /// A clear request took effect. The schedule should be destroyed.
    Cleared,
}

pub(crate) struct ChannelMapSchedule {
    request_id: RequestId,
    channel_map: ChannelMap,
    remaining_dw: u32,
    elapsed_dw: u32,
    clear_pending: bool,
}

impl ChannelMapSchedule {
    pub fn new(request_id: RequestId, channel_map: ChannelMap, num_dw: u32) -> Self {
        Self { request_id, channel_map, remaining_dw: num_dw, elapsed_dw: 0, clear_pending: false }
    }

    getter_field!(request_id, RequestId);
    getter_field!(clear_pending, bool);

    /// Stop the schedule at the start of the next broadcast window.
    pub fn request_clear(&mut self) {
        self.clear_pending = true;
    }

    /// Handle the start of a broadcast window.
    pub fn on_tick(&mut self) -> TickOutcome {
        if self.clear_pending {
            return TickOutcome::Cleared;
        }

        self.remaining_dw = self.remaining_dw.saturating_sub(1);
        self.elapsed_dw += 1;
        match self.remaining_dw {
            0 => TickOutcome::Expired,
            _ => TickOutcome::Advertising,
        }
    }

    pub fn status(&self) -> ChannelMapStatus {
        ChannelMapStatus {
            request_id: self.request_id,
            channel_map: self.channel_map.clone(),
            remaining_dw: self.remaining_dw,
            elapsed_dw: self.elapsed_dw,
            clear_pending: self.clear_pending,
        }
    }
}

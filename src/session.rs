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

//! This module provides the ranging session management: admission of the ranging batches, the
//! per-peer session state machine, the channel map schedules and the result delivery.

pub mod capability_store;
pub mod channel_map_schedule;
pub mod ranging_coordinator;
pub mod result_dispatcher;
pub mod rtt_session;

// Re-export the public elements.
pub use capability_store::CapabilityStore;
pub use channel_map_schedule::ChannelMapStatus;
pub use ranging_coordinator::CoordinatorConfig;
pub use result_dispatcher::RttEventHandler;
pub use rtt_session::SessionState;

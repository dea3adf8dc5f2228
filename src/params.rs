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

//! This module provides the types of the parameters or returned data of the public interfaces.

pub(super) mod utils;

pub mod channel_map_params;
pub mod rtt_config_params;
pub mod rtt_packets;
pub mod rtt_result;

// Re-export params from all of the sub-modules.
pub use channel_map_params::*;
pub use rtt_config_params::*;
pub use rtt_packets::*;
pub use rtt_result::*;

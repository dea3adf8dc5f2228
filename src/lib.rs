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

//! wifi_rtt_core coordinates Wi-Fi Round-Trip-Time ranging requests between the local
//! station and its peers. It admits batched ranging requests, drives one state machine per
//! peer, routes the driver's measurement events back to the requester, and manages the NBD
//! channel map broadcast schedule.

pub mod driver;
pub mod error;
pub mod params;
pub mod service;
pub mod session;

pub(crate) mod utils;

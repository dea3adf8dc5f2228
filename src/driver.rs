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

//! This module provides the boundary with the radio driver.

pub mod driver_gateway;

pub(crate) mod timeout_driver_gateway;

#[cfg(any(test, feature = "mock-utils"))]
pub mod mock_driver_gateway;

// Re-export the public elements.
pub use driver_gateway::{DriverEvent, DriverGateway, NopDriverGateway};
#[cfg(any(test, feature = "mock-utils"))]
pub use mock_driver_gateway::MockDriverGateway;
pub use timeout_driver_gateway::DEFAULT_DRIVER_TIMEOUT;

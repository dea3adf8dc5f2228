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

//! This module defines the RttServiceBuilder, the builder of the RttService.

use log::error;
use tokio::runtime::Runtime;

use crate::driver::driver_gateway::DriverGateway;
use crate::service::rtt_service::RttService;
use crate::session::capability_store::CapabilityStore;
use crate::session::ranging_coordinator::CoordinatorConfig;
use crate::utils::consuming_builder_field;

/// Create the default runtime for RttService.
pub fn default_runtime() -> Option<Runtime> {
    tokio::runtime::Builder::new_multi_thread().thread_name("RttService").enable_all().build().ok()
}

/// The builder of RttService, used to keep the backward compatibility when adding new parameters
/// of creating a RttService instance.
pub struct RttServiceBuilder<T: DriverGateway> {
    runtime: Option<Runtime>,
    driver_gateway: Option<T>,
    capability_store: Option<CapabilityStore>,
    coordinator_config: CoordinatorConfig,
}

impl<T: DriverGateway> Default for RttServiceBuilder<T> {
    fn default() -> Self {
        Self {
            runtime: None,
            driver_gateway: None,
            capability_store: None,
            coordinator_config: CoordinatorConfig::default(),
        }
    }
}

impl<T: DriverGateway> RttServiceBuilder<T> {
    /// Create a new builder.
    pub fn new() -> Self {
        Default::default()
    }

    consuming_builder_field!(runtime, Runtime, Some);
    consuming_builder_field!(driver_gateway, T, Some);
    consuming_builder_field!(capability_store, CapabilityStore, Some);
    consuming_builder_field!(coordinator_config, CoordinatorConfig);

    /// Build the RttService. The driver is opened here.
    pub fn build(mut self) -> Option<RttService> {
        let runtime = self.runtime.take().or_else(default_runtime)?;
        let driver_gateway = self.driver_gateway.take()?;
        let capability_store = self.capability_store.take()?;
        RttService::new(runtime, driver_gateway, capability_store, self.coordinator_config)
            .map_err(|e| error!("Failed to build the RttService: {:?}", e))
            .ok()
    }
}

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

//! This module defines the RttService, the entry of the library.

use log::error;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::driver::driver_gateway::DriverGateway;
use crate::driver::timeout_driver_gateway::TimeoutDriverGateway;
use crate::error::Result;
use crate::params::channel_map_params::ChannelMap;
use crate::params::rtt_config_params::RttConfig;
use crate::params::rtt_packets::{InterfaceHandle, MacAddress, RequestId, RttCapabilities};
use crate::session::capability_store::CapabilityStore;
use crate::session::channel_map_schedule::ChannelMapStatus;
use crate::session::ranging_coordinator::{CoordinatorConfig, RangingCoordinator};
use crate::session::result_dispatcher::RttEventHandler;
use crate::session::rtt_session::SessionState;

/// The entry class (a.k.a top shim) of the library. The class accepts requests from the
/// client, and delegates the requests to the RangingCoordinator.
///
/// All the methods block until the request is handled. They may be called from an
/// RttEventHandler, e.g. to cancel the request the handler is notified for, but not from a
/// task of the runtime owned by the service.
pub struct RttService {
    runtime: Runtime,
    coordinator: RangingCoordinator,
}

impl RttService {
    /// Open the driver and create a new RttService instance.
    pub(super) fn new<T: DriverGateway>(
        runtime: Runtime,
        driver: T,
        capability_store: CapabilityStore,
        config: CoordinatorConfig,
    ) -> Result<Self> {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let mut driver = TimeoutDriverGateway::new(driver, config.driver_timeout);
        let coordinator = runtime.block_on(async move {
            driver.open(event_sender).await.map_err(|e| {
                error!("Failed to open the driver: {:?}", e);
                e
            })?;
            RangingCoordinator::new(driver, capability_store, event_receiver, config)
        })?;

        Ok(Self { runtime, coordinator })
    }

    /// Submit a batch of ranging requests with the identifier |id|. The results are delivered
    /// to |handler|, which is released after the last session of the batch terminates.
    pub fn submit<H: RttEventHandler>(
        &self,
        id: RequestId,
        iface: InterfaceHandle,
        configs: Vec<RttConfig>,
        handler: H,
    ) -> Result<()> {
        self.runtime.block_on(self.coordinator.submit(id, iface, configs, Box::new(handler)))
    }

    /// Cancel the sessions with |peers|. An empty list cancels all the sessions of the batch
    /// |id|.
    pub fn cancel(&self, id: RequestId, peers: Vec<MacAddress>) -> Result<()> {
        self.runtime.block_on(self.coordinator.cancel(id, peers))
    }

    /// Query the ranging capabilities of the interface.
    pub fn query_capabilities(&self, iface: InterfaceHandle) -> Result<RttCapabilities> {
        self.runtime.block_on(self.coordinator.query_capabilities(iface))
    }

    /// Broadcast the channel map on |iface| for |num_dw| broadcast windows.
    pub fn publish_channel_map(
        &self,
        id: RequestId,
        iface: InterfaceHandle,
        channel_map: ChannelMap,
        num_dw: u32,
    ) -> Result<()> {
        self.runtime.block_on(self.coordinator.publish_channel_map(id, iface, channel_map, num_dw))
    }

    /// Stop broadcasting the channel map on |iface| from the next broadcast window.
    pub fn clear_channel_map(&self, id: RequestId, iface: InterfaceHandle) -> Result<()> {
        self.runtime.block_on(self.coordinator.clear_channel_map(id, iface))
    }

    /// The number of the sessions that are not terminated yet.
    pub fn session_count(&self) -> Result<usize> {
        self.runtime.block_on(self.coordinator.session_count())
    }

    /// The state of the session with the peer, if any.
    pub fn session_state(&self, addr: MacAddress) -> Result<Option<SessionState>> {
        self.runtime.block_on(self.coordinator.session_state(addr))
    }

    /// The status of the channel map schedule on |iface|, if any.
    pub fn channel_map_status(&self, iface: InterfaceHandle) -> Result<Option<ChannelMapStatus>> {
        self.runtime.block_on(self.coordinator.channel_map_status(iface))
    }

    /// Abort all the sessions, stop all the channel map schedules and close the driver. The
    /// following requests are rejected.
    pub fn close(&self) -> Result<()> {
        self.runtime.block_on(self.coordinator.close())
    }

    #[cfg(test)]
    fn block_on_for_testing<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

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

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::driver::driver_gateway::{DriverEvent, DriverGateway};
use crate::error::{Error, Result};
use crate::params::channel_map_params::ChannelMap;
use crate::params::rtt_config_params::ResolvedRttConfig;
use crate::params::rtt_packets::{InterfaceHandle, MacAddress};

/// The default bound of each driver call.
pub const DEFAULT_DRIVER_TIMEOUT: Duration = Duration::from_millis(1000);
// Loading the firmware may take a while when the driver is opened.
const DRIVER_OPEN_TIMEOUT: Duration = Duration::from_millis(20000);

/// Wraps a DriverGateway and fails every call that doesn't complete in time with
/// Error::Timeout.
pub(crate) struct TimeoutDriverGateway<T: DriverGateway> {
    driver: T,
    api_timeout: Duration,
}

impl<T: DriverGateway> TimeoutDriverGateway<T> {
    pub fn new(driver: T, api_timeout: Duration) -> Self {
        Self { driver, api_timeout }
    }

    async fn call_with_timeout(
        future: impl Future<Output = Result<()>>,
        duration: Duration,
    ) -> Result<()> {
        match timeout(duration, future).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }
}

#[async_trait]
impl<T: DriverGateway> DriverGateway for TimeoutDriverGateway<T> {
    async fn open(&mut self, event_sender: mpsc::UnboundedSender<DriverEvent>) -> Result<()> {
        Self::call_with_timeout(self.driver.open(event_sender), DRIVER_OPEN_TIMEOUT).await
    }

    async fn close(&mut self) -> Result<()> {
        Self::call_with_timeout(self.driver.close(), self.api_timeout).await
    }

    async fn start_ranging(
        &mut self,
        iface: InterfaceHandle,
        addr: MacAddress,
        config: &ResolvedRttConfig,
    ) -> Result<()> {
        Self::call_with_timeout(self.driver.start_ranging(iface, addr, config), self.api_timeout)
            .await
    }

    async fn stop_ranging(&mut self, iface: InterfaceHandle, addr: MacAddress) -> Result<()> {
        Self::call_with_timeout(self.driver.stop_ranging(iface, addr), self.api_timeout).await
    }

    async fn publish_schedule(
        &mut self,
        iface: InterfaceHandle,
        channel_map: &ChannelMap,
        num_dw: u32,
    ) -> Result<()> {
        Self::call_with_timeout(
            self.driver.publish_schedule(iface, channel_map, num_dw),
            self.api_timeout,
        )
        .await
    }

    async fn clear_schedule(&mut self, iface: InterfaceHandle) -> Result<()> {
        Self::call_with_timeout(self.driver.clear_schedule(iface), self.api_timeout).await
    }

    fn peer_two_sided_hint(&self, addr: MacAddress) -> Option<bool> {
        self.driver.peer_two_sided_hint(addr)
    }
}

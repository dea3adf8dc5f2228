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

//! This module defines the DriverGateway trait, the boundary between the ranging coordinator
//! and the radio driver that transmits and receives the ranging frames.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::params::channel_map_params::ChannelMap;
use crate::params::rtt_config_params::ResolvedRttConfig;
use crate::params::rtt_packets::{InterfaceHandle, MacAddress};
use crate::params::rtt_result::RawSample;

/// The event reported by the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverEvent {
    /// One logical measurement with the peer |addr| is done, successfully or not.
    ///
    /// The sample is routed by |addr| only. A sample of a cancelled session that is reported
    /// after a new session with the same peer has started is taken as a sample of the new
    /// session, so the driver should not report samples after stop_ranging() returns.
    Sample { addr: MacAddress, sample: RawSample },
    /// A broadcast window of the NBD cluster on |iface| has started.
    BroadcastWindowTick { iface: InterfaceHandle },
}

/// The trait for the radio driver. The client of this library should implement this trait
/// and inject into the library.
/// Note: Each method should be completed in 1000 ms.
#[async_trait]
pub trait DriverGateway: 'static + Send + Sync {
    /// Open the driver.
    ///
    /// All the other API should be called after the open() completes successfully. Once the
    /// method completes successfully, the DriverGateway instance should store |event_sender|
    /// and report the samples and the broadcast window ticks via the |event_sender|.
    async fn open(&mut self, event_sender: mpsc::UnboundedSender<DriverEvent>) -> Result<()>;

    /// Close the driver. The instance should drop the |event_sender| received from open().
    async fn close(&mut self) -> Result<()>;

    /// Start ranging with the peer. Returns as soon as the request is accepted; the
    /// measurements are reported later as DriverEvent::Sample, paced by the configured
    /// interval.
    async fn start_ranging(
        &mut self,
        iface: InterfaceHandle,
        addr: MacAddress,
        config: &ResolvedRttConfig,
    ) -> Result<()>;

    /// Stop issuing further attempts with the peer. Best effort: an attempt in flight may still
    /// be reported.
    async fn stop_ranging(&mut self, iface: InterfaceHandle, addr: MacAddress) -> Result<()>;

    /// Start broadcasting the channel map for |num_dw| broadcast windows.
    async fn publish_schedule(
        &mut self,
        iface: InterfaceHandle,
        channel_map: &ChannelMap,
        num_dw: u32,
    ) -> Result<()>;

    /// Stop broadcasting the channel map from the next broadcast window.
    async fn clear_schedule(&mut self, iface: InterfaceHandle) -> Result<()>;

    /// Whether the peer is known to support two-sided ranging, e.g. from its FTM responder
    /// capability learned at scan time.
    fn peer_two_sided_hint(&self, _addr: MacAddress) -> Option<bool> {
        None
    }
}

/// A placeholder implementation for DriverGateway that do nothing.
pub struct NopDriverGateway {}
#[async_trait]
impl DriverGateway for NopDriverGateway {
    async fn open(&mut self, _event_sender: mpsc::UnboundedSender<DriverEvent>) -> Result<()> {
        Ok(())
    }
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
    async fn start_ranging(
        &mut self,
        _iface: InterfaceHandle,
        _addr: MacAddress,
        _config: &ResolvedRttConfig,
    ) -> Result<()> {
        Ok(())
    }
    async fn stop_ranging(&mut self, _iface: InterfaceHandle, _addr: MacAddress) -> Result<()> {
        Ok(())
    }
    async fn publish_schedule(
        &mut self,
        _iface: InterfaceHandle,
        _channel_map: &ChannelMap,
        _num_dw: u32,
    ) -> Result<()> {
        Ok(())
    }
    async fn clear_schedule(&mut self, _iface: InterfaceHandle) -> Result<()> {
        Ok(())
    }
}

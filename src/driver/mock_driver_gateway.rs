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

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::time::timeout;

use crate::driver::driver_gateway::{DriverEvent, DriverGateway};
use crate::error::{Error, Result};
use crate::params::channel_map_params::ChannelMap;
use crate::params::rtt_config_params::ResolvedRttConfig;
use crate::params::rtt_packets::{InterfaceHandle, MacAddress, RttType};

/// The mock implementation of DriverGateway.
///
/// The expected calls are consumed in order. The events attached to an expected call are sent
/// to the event sender received from open() when the call is made.
#[derive(Clone, Default)]
pub struct MockDriverGateway {
    expected_calls: Arc<Mutex<VecDeque<ExpectedCall>>>,
    expect_call_consumed: Arc<Notify>,
    event_sender: Arc<Mutex<Option<mpsc::UnboundedSender<DriverEvent>>>>,
    peer_hints: Arc<Mutex<HashMap<MacAddress, bool>>>,
}

#[allow(dead_code)]
impl MockDriverGateway {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_open(&mut self, events: Vec<DriverEvent>, out: Result<()>) {
        self.push_expected_call(ExpectedCall::Open { events, out });
    }

    pub fn expect_close(&mut self, out: Result<()>) {
        self.push_expected_call(ExpectedCall::Close { out });
    }

    pub fn expect_start_ranging(
        &mut self,
        expected_iface: InterfaceHandle,
        expected_addr: MacAddress,
        expected_rtt_type: RttType,
        events: Vec<DriverEvent>,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::StartRanging {
            expected_iface,
            expected_addr,
            expected_rtt_type,
            events,
            out,
        });
    }

    pub fn expect_stop_ranging(
        &mut self,
        expected_iface: InterfaceHandle,
        expected_addr: MacAddress,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::StopRanging { expected_iface, expected_addr, out });
    }

    pub fn expect_publish_schedule(
        &mut self,
        expected_iface: InterfaceHandle,
        expected_channel_map: ChannelMap,
        expected_num_dw: u32,
        out: Result<()>,
    ) {
        self.push_expected_call(ExpectedCall::PublishSchedule {
            expected_iface,
            expected_channel_map,
            expected_num_dw,
            out,
        });
    }

    pub fn expect_clear_schedule(&mut self, expected_iface: InterfaceHandle, out: Result<()>) {
        self.push_expected_call(ExpectedCall::ClearSchedule { expected_iface, out });
    }

    /// Set the two-sided hint returned for the peer.
    pub fn set_peer_two_sided_hint(&mut self, addr: MacAddress, two_sided: bool) {
        self.peer_hints.lock().unwrap().insert(addr, two_sided);
    }

    /// Send an event as if the driver reported it.
    pub fn send_event(&self, event: DriverEvent) {
        if let Some(sender) = self.event_sender.lock().unwrap().as_ref() {
            let _ = sender.send(event);
        }
    }

    /// Wait until all the expected calls are consumed. Returns false on timeout.
    pub async fn wait_expected_calls_done(&mut self) -> bool {
        while !self.expected_calls.lock().unwrap().is_empty() {
            if timeout(Duration::from_secs(1), self.expect_call_consumed.notified()).await.is_err()
            {
                return false;
            }
        }
        true
    }

    fn push_expected_call(&mut self, call: ExpectedCall) {
        self.expected_calls.lock().unwrap().push_back(call);
    }

    fn pop_expected_call(&self) -> Option<ExpectedCall> {
        self.expected_calls.lock().unwrap().pop_front()
    }

    fn push_back_unmatched(&self, call: ExpectedCall) {
        self.expected_calls.lock().unwrap().push_front(call);
    }

    fn consumed(&self, events: Vec<DriverEvent>) {
        for event in events.into_iter() {
            self.send_event(event);
        }
        self.expect_call_consumed.notify_one();
    }
}

#[async_trait]
impl DriverGateway for MockDriverGateway {
    async fn open(&mut self, event_sender: mpsc::UnboundedSender<DriverEvent>) -> Result<()> {
        match self.pop_expected_call() {
            Some(ExpectedCall::Open { events, out }) => {
                self.event_sender.lock().unwrap().replace(event_sender);
                self.consumed(events);
                out
            }
            Some(call) => {
                self.push_back_unmatched(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.pop_expected_call() {
            Some(ExpectedCall::Close { out }) => {
                if out.is_ok() {
                    self.event_sender.lock().unwrap().take();
                }
                self.consumed(vec![]);
                out
            }
            Some(call) => {
                self.push_back_unmatched(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn start_ranging(
        &mut self,
        iface: InterfaceHandle,
        addr: MacAddress,
        config: &ResolvedRttConfig,
    ) -> Result<()> {
        match self.pop_expected_call() {
            Some(ExpectedCall::StartRanging {
                expected_iface,
                expected_addr,
                expected_rtt_type,
                events,
                out,
            }) if expected_iface == iface
                && expected_addr == addr
                && &expected_rtt_type == config.rtt_type() =>
            {
                self.consumed(events);
                out
            }
            Some(call) => {
                self.push_back_unmatched(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn stop_ranging(&mut self, iface: InterfaceHandle, addr: MacAddress) -> Result<()> {
        match self.pop_expected_call() {
            Some(ExpectedCall::StopRanging { expected_iface, expected_addr, out })
                if expected_iface == iface && expected_addr == addr =>
            {
                self.consumed(vec![]);
                out
            }
            Some(call) => {
                self.push_back_unmatched(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn publish_schedule(
        &mut self,
        iface: InterfaceHandle,
        channel_map: &ChannelMap,
        num_dw: u32,
    ) -> Result<()> {
        match self.pop_expected_call() {
            Some(ExpectedCall::PublishSchedule {
                expected_iface,
                expected_channel_map,
                expected_num_dw,
                out,
            }) if expected_iface == iface
                && &expected_channel_map == channel_map
                && expected_num_dw == num_dw =>
            {
                self.consumed(vec![]);
                out
            }
            Some(call) => {
                self.push_back_unmatched(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    async fn clear_schedule(&mut self, iface: InterfaceHandle) -> Result<()> {
        match self.pop_expected_call() {
            Some(ExpectedCall::ClearSchedule { expected_iface, out })
                if expected_iface == iface =>
            {
                self.consumed(vec![]);
                out
            }
            Some(call) => {
                self.push_back_unmatched(call);
                Err(Error::MockUndefined)
            }
            None => Err(Error::MockUndefined),
        }
    }

    fn peer_two_sided_hint(&self, addr: MacAddress) -> Option<bool> {
        self.peer_hints.lock().unwrap().get(&addr).copied()
    }
}

enum ExpectedCall {
    Open {
        events: Vec<DriverEvent>,
        out: Result<()>,
    },
    Close {
        out: Result<()>,
    },
    StartRanging {
        expected_iface: InterfaceHandle,
        expected_addr: MacAddress,
        expected_rtt_type: RttType,
        events: Vec<DriverEvent>,
        out: Result<()>,
    },
    StopRanging {
        expected_iface: InterfaceHandle,
        expected_addr: MacAddress,
        out: Result<()>,
    },
    PublishSchedule {
        expected_iface: InterfaceHandle,
        expected_channel_map: ChannelMap,
        expected_num_dw: u32,
        out: Result<()>,
    },
    ClearSchedule {
        expected_iface: InterfaceHandle,
        out: Result<()>,
    },
}

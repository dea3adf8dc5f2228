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

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::driver::driver_gateway::{DriverEvent, DriverGateway};
use crate::driver::timeout_driver_gateway::DEFAULT_DRIVER_TIMEOUT;
use crate::error::{Error, RejectReason, Result};
use crate::params::channel_map_params::ChannelMap;
use crate::params::rtt_config_params::{ResolvedRttConfig, RttConfig};
use crate::params::rtt_packets::{
    InterfaceHandle, MacAddress, RequestId, RttCapabilities, RttType,
};
use crate::params::rtt_result::{RttResult, RttStatus};
use crate::session::capability_store::CapabilityStore;
use crate::session::channel_map_schedule::{ChannelMapSchedule, ChannelMapStatus, TickOutcome};
use crate::session::result_dispatcher::{ResultDispatcher, RttEventHandler};
use crate::session::rtt_session::{RttSession, SessionState, SessionToken};
use crate::utils::clean_mpsc_receiver;

const DEFAULT_MAX_ACTIVE_SESSIONS: usize = 64;
const DEFAULT_REORDER_WINDOW: usize = 4;

/// The tunables of the RangingCoordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// The maximum number of sessions that are active at the same time, across all batches.
    pub max_active_sessions: usize,
    /// The number of out-of-order samples a continuous session buffers before it treats the
    /// missing measurements as lost.
    pub reorder_window: usize,
    /// The bound of each driver call.
    pub driver_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_active_sessions: DEFAULT_MAX_ACTIVE_SESSIONS,
            reorder_window: DEFAULT_REORDER_WINDOW,
            driver_timeout: DEFAULT_DRIVER_TIMEOUT,
        }
    }
}

/// The RangingCoordinator admits the ranging batches, drives one session per peer through its
/// lifecycle, routes the driver events to the sessions, and manages the channel map schedule
/// of each interface.
/// Using the actor model, RangingCoordinator delegates the requests to
/// RangingCoordinatorActor.
#[derive(Clone)]
pub(crate) struct RangingCoordinator {
    cmd_sender: mpsc::UnboundedSender<(Command, ResponseSender)>,
}

impl RangingCoordinator {
    /// Create the coordinator. The |driver| should be opened already, with the sender side of
    /// |event_receiver|.
    pub fn new<T: DriverGateway>(
        driver: T,
        capability_store: CapabilityStore,
        event_receiver: mpsc::UnboundedReceiver<DriverEvent>,
        config: CoordinatorConfig,
    ) -> Result<Self> {
        let dispatcher = ResultDispatcher::new()?;
        let (cmd_sender, cmd_receiver) = mpsc::unbounded_channel();
        let mut actor = RangingCoordinatorActor::new(
            cmd_receiver,
            driver,
            capability_store,
            event_receiver,
            dispatcher,
            config,
        );
        tokio::spawn(async move { actor.run().await });

        Ok(Self { cmd_sender })
    }

    pub async fn submit(
        &self,
        id: RequestId,
        iface: InterfaceHandle,
        configs: Vec<RttConfig>,
        handler: Box<dyn RttEventHandler>,
    ) -> Result<()> {
        self.send_cmd(Command::Submit { id, iface, configs, handler }).await.map(|_| ())
    }

    pub async fn cancel(&self, id: RequestId, peers: Vec<MacAddress>) -> Result<()> {
        self.send_cmd(Command::Cancel { id, peers }).await.map(|_| ())
    }

    pub async fn publish_channel_map(
        &self,
        id: RequestId,
        iface: InterfaceHandle,
        channel_map: ChannelMap,
        num_dw: u32,
    ) -> Result<()> {
        self.send_cmd(Command::PublishChannelMap { id, iface, channel_map, num_dw })
            .await
            .map(|_| ())
    }

    pub async fn clear_channel_map(&self, id: RequestId, iface: InterfaceHandle) -> Result<()> {
        self.send_cmd(Command::ClearChannelMap { id, iface }).await.map(|_| ())
    }

    pub async fn query_capabilities(&self, iface: InterfaceHandle) -> Result<RttCapabilities> {
        match self.send_cmd(Command::QueryCapabilities { iface }).await? {
            Response::Capabilities(caps) => Ok(caps),
            response => Self::unexpected(response),
        }
    }

    pub async fn session_count(&self) -> Result<usize> {
        match self.send_cmd(Command::GetSessionCount).await? {
            Response::SessionCount(count) => Ok(count),
            response => Self::unexpected(response),
        }
    }

    pub async fn session_state(&self, addr: MacAddress) -> Result<Option<SessionState>> {
        match self.send_cmd(Command::GetSessionState { addr }).await? {
            Response::SessionState(state) => Ok(state),
            response => Self::unexpected(response),
        }
    }

    pub async fn channel_map_status(
        &self,
        iface: InterfaceHandle,
    ) -> Result<Option<ChannelMapStatus>> {
        match self.send_cmd(Command::GetChannelMapStatus { iface }).await? {
            Response::ChannelMapStatus(status) => Ok(status),
            response => Self::unexpected(response),
        }
    }

    /// Abort all the sessions, stop all the schedules and close the driver.
    pub async fn close(&self) -> Result<()> {
        self.send_cmd(Command::Close).await.map(|_| ())
    }

    fn unexpected<R>(response: Response) -> Result<R> {
        error!("Received an unexpected response: {:?}", response);
        Err(Error::Unknown)
    }

    // Send the |cmd| to the RangingCoordinatorActor.
    async fn send_cmd(&self, cmd: Command) -> Result<Response> {
        let (result_sender, result_receiver) = oneshot::channel();
        self.cmd_sender.send((cmd, result_sender)).map_err(|_| {
            error!("Failed to send cmd to the RangingCoordinatorActor");
            Error::Unknown
        })?;
        result_receiver.await.unwrap_or(Err(Error::Unknown))
    }
}

type ResponseSender = oneshot::Sender<Result<Response>>;

struct RangingCoordinatorActor<T: DriverGateway> {
    // Receive the commands and the corresponding response senders from RangingCoordinator.
    cmd_receiver: mpsc::UnboundedReceiver<(Command, ResponseSender)>,

    driver: T,
    // Receive the events from |driver|.
    event_receiver: mpsc::UnboundedReceiver<DriverEvent>,
    capability_store: CapabilityStore,
    dispatcher: ResultDispatcher,
    config: CoordinatorConfig,

    // The driver events only carry the peer address, so a peer belongs to one session at most.
    sessions: BTreeMap<MacAddress, RttSession>,
    // The peers of each admitted batch that still has a session.
    batches: BTreeMap<RequestId, BTreeSet<MacAddress>>,
    schedules: BTreeMap<InterfaceHandle, ChannelMapSchedule>,
    next_token: SessionToken,
    is_closed: bool,
}

impl<T: DriverGateway> RangingCoordinatorActor<T> {
    fn new(
        cmd_receiver: mpsc::UnboundedReceiver<(Command, ResponseSender)>,
        driver: T,
        capability_store: CapabilityStore,
        event_receiver: mpsc::UnboundedReceiver<DriverEvent>,
        dispatcher: ResultDispatcher,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            cmd_receiver,
            driver,
            event_receiver,
            capability_store,
            dispatcher,
            config,
            sessions: BTreeMap::new(),
            batches: BTreeMap::new(),
            schedules: BTreeMap::new(),
            next_token: 0,
            is_closed: false,
        }
    }

    async fn run(&mut self) {
        loop {
            tokio::select! {
                // The events already reported by the driver are handled before the next command.
                biased;

                Some(event) = self.event_receiver.recv() => {
                    self.handle_driver_event(event).await;
                }

                cmd = self.cmd_receiver.recv() => {
                    match cmd {
                        None => {
                            debug!("RangingCoordinator is about to drop.");
                            clean_mpsc_receiver(&mut self.event_receiver);
                            break;
                        },
                        Some((cmd, result_sender)) => {
                            let result = self.handle_cmd(cmd).await;
                            let _ = result_sender.send(result);
                        }
                    }
                }
            }
        }
    }

    async fn handle_cmd(&mut self, cmd: Command) -> Result<Response> {
        match cmd {
            Command::Submit { id, iface, configs, handler } => {
                self.submit(id, iface, configs, handler).await.map(|_| Response::Null)
            }
            Command::Cancel { id, peers } => {
                self.cancel(id, peers).await;
                Ok(Response::Null)
            }
            Command::PublishChannelMap { id, iface, channel_map, num_dw } => self
                .publish_channel_map(id, iface, channel_map, num_dw)
                .await
                .map(|_| Response::Null),
            Command::ClearChannelMap { id, iface } => {
                self.clear_channel_map(id, iface).await;
                Ok(Response::Null)
            }
            Command::QueryCapabilities { iface } => {
                self.capability_store.query(iface).map(Response::Capabilities)
            }
            Command::GetSessionCount => Ok(Response::SessionCount(self.sessions.len())),
            Command::GetSessionState { addr } => {
                Ok(Response::SessionState(self.sessions.get(&addr).map(|s| *s.state())))
            }
            Command::GetChannelMapStatus { iface } => {
                Ok(Response::ChannelMapStatus(self.schedules.get(&iface).map(|s| s.status())))
            }
            Command::Close => self.close().await.map(|_| Response::Null),
        }
    }

    async fn submit(
        &mut self,
        id: RequestId,
        iface: InterfaceHandle,
        configs: Vec<RttConfig>,
        handler: Box<dyn RttEventHandler>,
    ) -> Result<()> {
        if self.is_closed {
            error!("The driver is closed, reject the request {}", id);
            return Err(Error::HardwareUnavailable);
        }
        let resolved_configs = self.admit(id, iface, configs).map_err(|e| {
            error!("Reject the request {}: {}", id, e);
            e
        })?;

        info!("Admit the request {} with {} peers", id, resolved_configs.len());
        self.dispatcher.register(id, handler);
        let addrs: Vec<MacAddress> =
            resolved_configs.iter().map(|config| *config.config().addr()).collect();
        self.batches.insert(id, addrs.iter().copied().collect());
        for config in resolved_configs.into_iter() {
            let token = self.next_token;
            self.next_token += 1;
            let session = RttSession::new(token, id, iface, config, self.config.reorder_window);
            self.sessions.insert(session.addr(), session);
        }

        for addr in addrs.into_iter() {
            let config = match self.sessions.get(&addr) {
                Some(session) => session.config().clone(),
                None => continue,
            };
            match self.driver.start_ranging(iface, addr, &config).await {
                Ok(()) => {
                    if let Some(session) = self.sessions.get_mut(&addr) {
                        session.activate();
                    }
                }
                Err(e) => {
                    error!("Failed to start ranging with {}: {:?}", addr, e);
                    if let Some(session) = self.sessions.get_mut(&addr) {
                        let result = session.fail(RttStatus::Failure);
                        self.dispatcher.deliver(id, vec![(*session.token(), result)]);
                    }
                    self.remove_session(addr);
                }
            }
        }
        Ok(())
    }

    // Validate the whole batch before any state is created.
    fn admit(
        &self,
        id: RequestId,
        iface: InterfaceHandle,
        configs: Vec<RttConfig>,
    ) -> Result<Vec<ResolvedRttConfig>> {
        if configs.is_empty() {
            return Err(RejectReason::EmptyBatch.into());
        }
        if self.batches.contains_key(&id) || self.is_schedule_id(id) {
            return Err(RejectReason::DuplicatedRequestId.into());
        }
        let capabilities = self.capability_store.query(iface)?;

        let mut addrs = BTreeSet::new();
        for config in configs.iter() {
            if !addrs.insert(*config.addr()) {
                return Err(RejectReason::DuplicatedPeerInBatch.into());
            }
        }
        if addrs.iter().any(|addr| self.sessions.contains_key(addr)) {
            return Err(RejectReason::PeerBusy.into());
        }
        if self.sessions.len() + configs.len() > self.config.max_active_sessions {
            return Err(RejectReason::MaxSessionsExceeded.into());
        }

        configs
            .into_iter()
            .map(|config| -> Result<ResolvedRttConfig> {
                if config.peer_type().requires_channel_info() && !config.channel().is_specified()
                {
                    return Err(RejectReason::MissingChannelInfo.into());
                }
                let hint = self.driver.peer_two_sided_hint(*config.addr());
                let rtt_type = resolve_rtt_type(*config.rtt_type(), &capabilities, hint)
                    .ok_or(Error::BatchRejected(RejectReason::UnsupportedMode))?;
                debug!("Resolve {:?} to {:?} for {}", config.rtt_type(), rtt_type, config.addr());
                Ok(ResolvedRttConfig::new(config, rtt_type))
            })
            .collect()
    }

    async fn cancel(&mut self, id: RequestId, peers: Vec<MacAddress>) {
        let peers: Vec<MacAddress> = match peers.is_empty() {
            true => self.batches.get(&id).map(|p| p.iter().copied().collect()).unwrap_or_default(),
            false => peers,
        };

        let mut aborted: BTreeMap<RequestId, Vec<(SessionToken, RttResult)>> = BTreeMap::new();
        let mut stopped = vec![];
        for addr in peers.into_iter() {
            let session = match self.sessions.get_mut(&addr) {
                Some(session) => session,
                None => {
                    debug!("No session with {}, ignore the cancel", addr);
                    continue;
                }
            };
            if session.request_id() != &id {
                debug!("Cancel {} of the request {} by {}", addr, session.request_id(), id);
            }

            self.dispatcher.revoke(*session.token());
            let result = session.abort();
            aborted.entry(*session.request_id()).or_default().push((*session.token(), result));
            stopped.push((*session.iface(), addr));
        }

        for (iface, addr) in stopped.iter() {
            if let Err(e) = self.driver.stop_ranging(*iface, *addr).await {
                warn!("Failed to stop ranging with {}: {:?}", addr, e);
            }
        }
        for (request_id, results) in aborted.into_iter() {
            self.dispatcher.deliver(request_id, results);
        }
        for (_, addr) in stopped.into_iter() {
            self.remove_session(addr);
        }
    }

    async fn publish_channel_map(
        &mut self,
        id: RequestId,
        iface: InterfaceHandle,
        channel_map: ChannelMap,
        num_dw: u32,
    ) -> Result<()> {
        if self.is_closed {
            error!("The driver is closed, reject the channel map {}", id);
            return Err(Error::HardwareUnavailable);
        }
        if !channel_map.is_valid() || num_dw == 0 {
            error!(
                "Reject the channel map {}: {} windows for {} DWs",
                id,
                channel_map.windows.len(),
                num_dw
            );
            return Err(RejectReason::InvalidChannelMap.into());
        }
        self.capability_store.query(iface)?;
        let used_by_other_iface =
            self.schedules.iter().any(|(i, s)| *i != iface && s.request_id() == &id);
        if self.batches.contains_key(&id) || used_by_other_iface {
            error!("Reject the channel map {}: the identifier is in use", id);
            return Err(RejectReason::DuplicatedRequestId.into());
        }

        if let Err(e) = self.driver.publish_schedule(iface, &channel_map, num_dw).await {
            // The prior schedule of the interface, if any, stays in effect.
            error!("Failed to publish the channel map {}: {:?}", id, e);
            return Err(e);
        }
        let schedule = ChannelMapSchedule::new(id, channel_map, num_dw);
        if let Some(old) = self.schedules.insert(iface, schedule) {
            debug!("The channel map {} on {} is replaced by {}", old.request_id(), iface, id);
        }
        Ok(())
    }

    async fn clear_channel_map(&mut self, id: RequestId, iface: InterfaceHandle) {
        let schedule = match self.schedules.get_mut(&iface) {
            Some(schedule) => schedule,
            None => {
                debug!("No channel map on {}, ignore the clear", iface);
                return;
            }
        };
        if schedule.request_id() != &id {
            warn!("The channel map {} on {} is cleared by {}", schedule.request_id(), iface, id);
        }
        if *schedule.clear_pending() {
            return;
        }

        schedule.request_clear();
        if let Err(e) = self.driver.clear_schedule(iface).await {
            warn!("Failed to clear the channel map on {}: {:?}", iface, e);
        }
    }

    async fn close(&mut self) -> Result<()> {
        let ids: Vec<RequestId> = self.batches.keys().copied().collect();
        for id in ids.into_iter() {
            self.cancel(id, vec![]).await;
        }
        let ifaces: Vec<InterfaceHandle> = self.schedules.keys().copied().collect();
        for iface in ifaces.into_iter() {
            self.schedules.remove(&iface);
            if let Err(e) = self.driver.clear_schedule(iface).await {
                warn!("Failed to clear the channel map on {}: {:?}", iface, e);
            }
        }

        self.is_closed = true;
        self.driver.close().await
    }

    async fn handle_driver_event(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::Sample { addr, sample } => {
                let session = match self.sessions.get_mut(&addr) {
                    Some(session) => session,
                    None => {
                        warn!("Discard the sample of {} without session", addr);
                        return;
                    }
                };

                let results = session.on_sample(&sample);
                let id = *session.request_id();
                let token = *session.token();
                let is_terminal = session.state().is_terminal();
                // Deliver one callback per measurement.
                for result in results.into_iter() {
                    self.dispatcher.deliver(id, vec![(token, result)]);
                }
                if is_terminal {
                    self.remove_session(addr);
                }
            }
            DriverEvent::BroadcastWindowTick { iface } => {
                let outcome = match self.schedules.get_mut(&iface) {
                    Some(schedule) => schedule.on_tick(),
                    None => return,
                };
                match outcome {
                    TickOutcome::Advertising => {}
                    TickOutcome::Cleared => {
                        debug!("The channel map on {} is cleared", iface);
                        self.schedules.remove(&iface);
                    }
                    TickOutcome::Expired => {
                        debug!("The channel map on {} is expired", iface);
                        self.schedules.remove(&iface);
                        if let Err(e) = self.driver.clear_schedule(iface).await {
                            warn!("Failed to clear the channel map on {}: {:?}", iface, e);
                        }
                    }
                }
            }
        }
    }

    // Destroy the session, and release the identifier with its last session.
    fn remove_session(&mut self, addr: MacAddress) {
        let session = match self.sessions.remove(&addr) {
            Some(session) => session,
            None => return,
        };
        let id = *session.request_id();
        debug!(
            "Destroy the session of {} at {:?}: {} results, last measurement {}",
            addr,
            session.state(),
            session.history().len(),
            session.measurement_num()
        );
        let is_batch_done = match self.batches.get_mut(&id) {
            Some(peers) => {
                peers.remove(&addr);
                peers.is_empty()
            }
            None => false,
        };
        if is_batch_done {
            debug!("The request {} is done", id);
            self.batches.remove(&id);
            self.dispatcher.unregister(id);
        }
    }

    fn is_schedule_id(&self, id: RequestId) -> bool {
        self.schedules.values().any(|schedule| schedule.request_id() == &id)
    }
}

/// Resolve the requested ranging mode with the capabilities of the radio and the hint of the
/// peer. Returns None if the radio can't range in the requested mode.
fn resolve_rtt_type(
    requested: RttType,
    capabilities: &RttCapabilities,
    peer_two_sided_hint: Option<bool>,
) -> Option<RttType> {
    match requested {
        RttType::OneSided => capabilities.supports_one_sided().then_some(RttType::OneSided),
        RttType::TwoSided => capabilities.supports_two_sided().then_some(RttType::TwoSided),
        RttType::Auto => {
            if peer_two_sided_hint == Some(true) && capabilities.supports_two_sided() {
                Some(RttType::TwoSided)
            } else if capabilities.supports_one_sided() {
                Some(RttType::OneSided)
            } else if capabilities.supports_two_sided() {
                Some(RttType::TwoSided)
            } else {
                None
            }
        }
    }
}

enum Command {
    Submit {
        id: RequestId,
        iface: InterfaceHandle,
        configs: Vec<RttConfig>,
        handler: Box<dyn RttEventHandler>,
    },
    Cancel {
        id: RequestId,
        peers: Vec<MacAddress>,
    },
    PublishChannelMap {
        id: RequestId,
        iface: InterfaceHandle,
        channel_map: ChannelMap,
        num_dw: u32,
    },
    ClearChannelMap {
        id: RequestId,
        iface: InterfaceHandle,
    },
    QueryCapabilities {
        iface: InterfaceHandle,
    },
    GetSessionCount,
    GetSessionState {
        addr: MacAddress,
    },
    GetChannelMapStatus {
        iface: InterfaceHandle,
    },
    Close,
}

#[derive(Debug)]
enum Response {
    Null,
    Capabilities(RttCapabilities),
    SessionCount(usize),
    SessionState(Option<SessionState>),
    ChannelMapStatus(Option<ChannelMapStatus>),
}

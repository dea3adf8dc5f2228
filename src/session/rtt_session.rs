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

//! This module defines the per-peer ranging session and its state machine.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::params::rtt_config_params::ResolvedRttConfig;
use crate::params::rtt_packets::{InterfaceHandle, MacAddress, RequestId, RttType};
use crate::params::rtt_result::{RawSample, RttResult, RttStatus};
use crate::utils::getter_field;

/// The opaque identity of a session. It is unique among all the sessions created by one
/// coordinator, including the destroyed ones.
pub(crate) type SessionToken = u64;

/// The state of a ranging session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// The session is admitted, and is waiting for the driver to start ranging.
    Pending,
    /// The driver is ranging with the peer.
    Active,
    /// All the measurements are delivered.
    Completed,
    /// The session is cancelled.
    Aborted,
    /// The session is terminated by a failure.
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }
}

/// The ranging session with one peer.
///
/// The samples of a continuous session may arrive out of order. They are buffered and released
/// in measurement order. When more than `reorder_window` samples are buffered, the missing
/// measurements are treated as lost.
pub(crate) struct RttSession {
    token: SessionToken,
    request_id: RequestId,
    iface: InterfaceHandle,
    config: ResolvedRttConfig,
    state: SessionState,
    // The measurement number of the last delivered result.
    measurement_num: u32,
    reorder_buffer: BTreeMap<u32, RttResult>,
    reorder_window: usize,
    history: Vec<RttResult>,
}

impl RttSession {
    pub fn new(
        token: SessionToken,
        request_id: RequestId,
        iface: InterfaceHandle,
        config: ResolvedRttConfig,
        reorder_window: usize,
    ) -> Self {
        Self {
            token,
            request_id,
            iface,
            config,
            state: SessionState::Pending,
            measurement_num: 0,
            reorder_buffer: BTreeMap::new(),
            reorder_window,
            history: vec![],
        }
    }

    getter_field!(token, SessionToken);
    getter_field!(request_id, RequestId);
    getter_field!(iface, InterfaceHandle);
    getter_field!(config, ResolvedRttConfig);
    getter_field!(state, SessionState);
    getter_field!(measurement_num, u32);
    getter_field!(history, Vec<RttResult>);

    pub fn addr(&self) -> MacAddress {
        *self.config.config().addr()
    }

    /// The driver accepted the session.
    pub fn activate(&mut self) {
        if self.state == SessionState::Pending {
            self.state = SessionState::Active;
        }
    }

    /// Handle a sample of the peer, and return the results that are ready to be delivered in
    /// measurement order.
    pub fn on_sample(&mut self, sample: &RawSample) -> Vec<RttResult> {
        if self.state != SessionState::Active {
            warn!("Discard the sample of {} at state {:?}", self.addr(), self.state);
            return vec![];
        }

        let total = self.config.config().total_measurements();
        let num = sample.measurement_num.unwrap_or(self.measurement_num + 1);
        if num <= self.measurement_num || num > total || self.reorder_buffer.contains_key(&num) {
            warn!("Discard the stale sample {} of {}", num, self.addr());
            return vec![];
        }

        let rtt_type = *self.config.rtt_type();
        if sample.peer_two_sided_hint == Some(true) && rtt_type == RttType::OneSided {
            debug!("{} reports two-sided support, keep ranging one-sided", self.addr());
        }

        let result = RttResult::from_sample(
            self.addr(),
            num,
            sample,
            rtt_type,
            *self.config.config().peer_type(),
            *self.config.config().channel(),
        );
        self.reorder_buffer.insert(num, result);

        let mut ready = vec![];
        self.release_in_order(&mut ready);
        while self.reorder_buffer.len() > self.reorder_window {
            let lowest = match self.reorder_buffer.keys().next() {
                Some(lowest) => *lowest,
                None => break,
            };
            warn!(
                "The measurements {} to {} of {} are lost",
                self.measurement_num + 1,
                lowest - 1,
                self.addr()
            );
            self.measurement_num = lowest - 1;
            self.release_in_order(&mut ready);
        }

        if total == 1 {
            if let Some(result) = ready.first() {
                self.state = match result.status.is_success() {
                    true => SessionState::Completed,
                    false => SessionState::Failed,
                };
            }
        } else if self.measurement_num >= total {
            self.state = SessionState::Completed;
        }
        if self.state.is_terminal() {
            debug!("The session of {} is {:?}", self.addr(), self.state);
        }

        self.history.extend(ready.iter().cloned());
        ready
    }

    /// Terminate the session by a failure, and return its terminal result.
    pub fn fail(&mut self, status: RttStatus) -> RttResult {
        self.terminate(SessionState::Failed, status)
    }

    /// Cancel the session, and return its terminal result.
    pub fn abort(&mut self) -> RttResult {
        self.terminate(SessionState::Aborted, RttStatus::Aborted)
    }

    fn terminate(&mut self, state: SessionState, status: RttStatus) -> RttResult {
        if !self.reorder_buffer.is_empty() {
            debug!("Drop {} buffered samples of {}", self.reorder_buffer.len(), self.addr());
            self.reorder_buffer.clear();
        }
        self.state = state;

        let result = RttResult::terminal(
            self.addr(),
            self.measurement_num,
            status,
            *self.config.rtt_type(),
            *self.config.config().peer_type(),
            *self.config.config().channel(),
        );
        self.history.push(result.clone());
        result
    }

    fn release_in_order(&mut self, ready: &mut Vec<RttResult>) {
        while let Some(result) = self.reorder_buffer.remove(&(self.measurement_num + 1)) {
            self.measurement_num += 1;
            ready.push(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::params::rtt_config_params::RttConfigBuilder;

    const ADDR: MacAddress = MacAddress::new([0x0a, 0, 0, 0, 0, 1]);

    fn single_shot_session() -> RttSession {
        let config = RttConfigBuilder::new().addr(ADDR).build().unwrap();
        let mut session =
            RttSession::new(1, 10, 0, ResolvedRttConfig::new(config, RttType::OneSided), 4);
        session.activate();
        session
    }

    fn continuous_session(num_measurements: u32, reorder_window: usize) -> RttSession {
        let config = RttConfigBuilder::new()
            .addr(ADDR)
            .continuous(true)
            .interval_ms(100)
            .num_measurements(num_measurements)
            .build()
            .unwrap();
        let mut session = RttSession::new(
            2,
            11,
            0,
            ResolvedRttConfig::new(config, RttType::TwoSided),
            reorder_window,
        );
        session.activate();
        session
    }

    fn sample(measurement_num: u32) -> RawSample {
        RawSample { measurement_num: Some(measurement_num), rtt_ns: 10, ..Default::default() }
    }

    fn numbers(results: &[RttResult]) -> Vec<u32> {
        results.iter().map(|r| r.measurement_num).collect()
    }

    #[test]
    fn test_single_shot_completed() {
        let mut session = single_shot_session();
        let results = session.on_sample(&RawSample::default());
        assert_eq!(numbers(&results), vec![1]);
        assert_eq!(results[0].rtt_type, RttType::OneSided);
        assert_eq!(session.state(), &SessionState::Completed);

        // The terminated session ignores further samples.
        assert!(session.on_sample(&RawSample::default()).is_empty());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_single_shot_failed() {
        let mut session = single_shot_session();
        let sample = RawSample { status_code: RttStatus::NoResponse as u8, ..Default::default() };
        let results = session.on_sample(&sample);
        assert_eq!(results[0].status, RttStatus::NoResponse);
        assert_eq!(session.state(), &SessionState::Failed);
    }

    #[test]
    fn test_pending_session_ignores_samples() {
        let config = RttConfigBuilder::new().addr(ADDR).build().unwrap();
        let mut session =
            RttSession::new(1, 10, 0, ResolvedRttConfig::new(config, RttType::OneSided), 4);
        assert!(session.on_sample(&RawSample::default()).is_empty());
        assert_eq!(session.state(), &SessionState::Pending);
    }

    #[test]
    fn test_continuous_in_order() {
        let mut session = continuous_session(5, 4);
        for num in 1..5 {
            assert_eq!(numbers(&session.on_sample(&sample(num))), vec![num]);
            assert_eq!(session.state(), &SessionState::Active);
        }
        assert_eq!(numbers(&session.on_sample(&sample(5))), vec![5]);
        assert_eq!(session.state(), &SessionState::Completed);
        assert_eq!(numbers(session.history()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_continuous_unnumbered_samples() {
        let mut session = continuous_session(3, 4);
        for num in 1..=3 {
            assert_eq!(numbers(&session.on_sample(&RawSample::default())), vec![num]);
        }
        assert_eq!(session.state(), &SessionState::Completed);
    }

    #[test]
    fn test_continuous_reordered() {
        let mut session = continuous_session(5, 4);
        assert!(session.on_sample(&sample(2)).is_empty());
        assert!(session.on_sample(&sample(3)).is_empty());
        assert_eq!(numbers(&session.on_sample(&sample(1))), vec![1, 2, 3]);
        assert!(session.on_sample(&sample(5)).is_empty());
        assert_eq!(numbers(&session.on_sample(&sample(4))), vec![4, 5]);
        assert_eq!(session.state(), &SessionState::Completed);
    }

    #[test]
    fn test_continuous_discard_stale_and_duplicated() {
        let mut session = continuous_session(5, 4);
        assert_eq!(numbers(&session.on_sample(&sample(1))), vec![1]);
        assert!(session.on_sample(&sample(1)).is_empty());
        assert!(session.on_sample(&sample(3)).is_empty());
        assert!(session.on_sample(&sample(3)).is_empty());
        assert!(session.on_sample(&sample(6)).is_empty());
        assert_eq!(numbers(&session.on_sample(&sample(2))), vec![2, 3]);
    }

    #[test]
    fn test_continuous_reorder_overflow_skips_lost() {
        let mut session = continuous_session(10, 2);
        assert!(session.on_sample(&sample(2)).is_empty());
        assert!(session.on_sample(&sample(3)).is_empty());
        // The measurement 1 is treated as lost.
        assert_eq!(numbers(&session.on_sample(&sample(5))), vec![2, 3]);
        assert_eq!(session.measurement_num(), &3);

        // The late measurement 1 is stale now.
        assert!(session.on_sample(&sample(1)).is_empty());
        assert_eq!(numbers(&session.on_sample(&sample(4))), vec![4, 5]);
    }

    #[test]
    fn test_failed_measurement_counts() {
        let mut session = continuous_session(2, 4);
        let failed = RawSample { status_code: RttStatus::Timeout as u8, ..Default::default() };
        let results = session.on_sample(&failed);
        assert_eq!(results[0].status, RttStatus::Timeout);
        assert_eq!(session.state(), &SessionState::Active);
        session.on_sample(&RawSample::default());
        assert_eq!(session.state(), &SessionState::Completed);
    }

    #[test]
    fn test_two_sided_hint_keeps_resolved_mode() {
        let mut session = single_shot_session();
        let sample = RawSample { peer_two_sided_hint: Some(true), ..Default::default() };
        let results = session.on_sample(&sample);
        assert_eq!(results[0].rtt_type, RttType::OneSided);
        assert_eq!(session.config().rtt_type(), &RttType::OneSided);
    }

    #[test]
    fn test_abort() {
        let mut session = continuous_session(5, 4);
        session.on_sample(&sample(1));
        session.on_sample(&sample(3));

        let result = session.abort();
        assert_eq!(result.status, RttStatus::Aborted);
        assert_eq!(result.measurement_num, 1);
        assert_eq!(result.addr, ADDR);
        assert_eq!(session.state(), &SessionState::Aborted);
        assert!(session.state().is_terminal());

        // The buffered measurement 3 is never delivered.
        assert!(session.on_sample(&sample(2)).is_empty());
        assert_eq!(numbers(session.history()), vec![1, 1]);
    }

    #[test]
    fn test_fail() {
        let mut session = single_shot_session();
        let result = session.fail(RttStatus::Failure);
        assert_eq!(result.status, RttStatus::Failure);
        assert_eq!(result.measurement_num, 0);
        assert_eq!(session.state(), &SessionState::Failed);
    }
}

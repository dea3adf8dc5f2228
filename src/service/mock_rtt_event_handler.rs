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

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio::time::{timeout, Duration};

use crate::params::rtt_packets::RequestId;
use crate::params::rtt_result::RttResult;
use crate::session::result_dispatcher::RttEventHandler;

#[derive(Clone, Default)]
pub(crate) struct MockRttEventHandler {
    expected_calls: Arc<Mutex<VecDeque<ExpectedCall>>>,
    expect_call_consumed: Arc<Notify>,
}

impl MockRttEventHandler {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_on_rtt_results(&mut self, id: RequestId, results: Vec<RttResult>) {
        self.push_expected_call(ExpectedCall::RttResults { id, results });
    }

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

    fn pop_expected_call(&mut self) -> ExpectedCall {
        let call = self.expected_calls.lock().unwrap().pop_front().unwrap();
        self.expect_call_consumed.notify_one();
        call
    }
}

impl RttEventHandler for MockRttEventHandler {
    fn on_rtt_results(&mut self, id: RequestId, results: Vec<RttResult>) {
        assert_eq!(self.pop_expected_call(), ExpectedCall::RttResults { id, results });
    }
}

#[derive(PartialEq, Debug)]
pub(crate) enum ExpectedCall {
    RttResults { id: RequestId, results: Vec<RttResult> },
}

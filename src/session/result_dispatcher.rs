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

//! This module defines the ResultDispatcher, which delivers the ranging results to the handler
//! of each request.
//!
//! The handlers are called on a dedicated thread outside of the runtime, so a handler is
//! allowed to call back into the service, e.g. to cancel the request it is notified for.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, error, warn};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::params::rtt_packets::RequestId;
use crate::params::rtt_result::{RttResult, RttStatus};
use crate::session::rtt_session::SessionToken;

const DISPATCHER_THREAD_NAME: &str = "RttResultDispatcher";

/// The handler of the ranging results of one request.
pub trait RttEventHandler: 'static + Send {
    /// Called with the results of the request |id|. The results of one peer are delivered in
    /// measurement order.
    fn on_rtt_results(&mut self, id: RequestId, results: Vec<RttResult>);
}

impl<F> RttEventHandler for F
where
    F: FnMut(RequestId, Vec<RttResult>) + Send + 'static,
{
    fn on_rtt_results(&mut self, id: RequestId, results: Vec<RttResult>) {
        self(id, results)
    }
}

enum Dispatch {
    Register { id: RequestId, handler: Box<dyn RttEventHandler> },
    Results { id: RequestId, results: Vec<(SessionToken, RttResult)> },
    Unregister { id: RequestId },
}

/// The messages are processed in the order they are sent, so a handler registered before the
/// results of its request always receives them, and is dropped only after all of them are
/// delivered.
pub(crate) struct ResultDispatcher {
    sender: mpsc::UnboundedSender<Dispatch>,
    revoked: Arc<Mutex<HashSet<SessionToken>>>,
}

impl ResultDispatcher {
    pub fn new() -> Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let revoked = Arc::new(Mutex::new(HashSet::new()));
        let revoked_clone = revoked.clone();
        thread::Builder::new()
            .name(DISPATCHER_THREAD_NAME.to_owned())
            .spawn(move || run(receiver, revoked_clone))
            .map_err(|e| {
                error!("Failed to spawn the result dispatcher: {:?}", e);
                Error::Unknown
            })?;
        Ok(Self { sender, revoked })
    }

    pub fn register(&self, id: RequestId, handler: Box<dyn RttEventHandler>) {
        self.send(Dispatch::Register { id, handler });
    }

    pub fn deliver(&self, id: RequestId, results: Vec<(SessionToken, RttResult)>) {
        self.send(Dispatch::Results { id, results });
    }

    pub fn unregister(&self, id: RequestId) {
        self.send(Dispatch::Unregister { id });
    }

    /// Drop all the pending results of the session, except its aborted result. Must be called
    /// before the aborted result is delivered.
    pub fn revoke(&self, token: SessionToken) {
        match self.revoked.lock() {
            Ok(mut revoked) => {
                revoked.insert(token);
            }
            Err(e) => error!("The revoked set is poisoned: {:?}", e),
        }
    }

    fn send(&self, dispatch: Dispatch) {
        if self.sender.send(dispatch).is_err() {
            error!("The result dispatcher is gone");
        }
    }
}

fn run(
    mut receiver: mpsc::UnboundedReceiver<Dispatch>,
    revoked: Arc<Mutex<HashSet<SessionToken>>>,
) {
    let mut handlers: BTreeMap<RequestId, Box<dyn RttEventHandler>> = BTreeMap::new();
    while let Some(dispatch) = receiver.blocking_recv() {
        match dispatch {
            Dispatch::Register { id, handler } => {
                if handlers.insert(id, handler).is_some() {
                    warn!("The handler of request {} is replaced", id);
                }
            }
            Dispatch::Results { id, results } => {
                let results = filter_revoked(&revoked, results);
                if results.is_empty() {
                    continue;
                }
                match handlers.get_mut(&id) {
                    Some(handler) => handler.on_rtt_results(id, results),
                    None => warn!("Drop {} results of the unknown request {}", results.len(), id),
                }
            }
            Dispatch::Unregister { id } => {
                if handlers.remove(&id).is_none() {
                    warn!("The handler of request {} is not registered", id);
                }
            }
        }
    }
    debug!("ResultDispatcher is about to drop.");
}

fn filter_revoked(
    revoked: &Mutex<HashSet<SessionToken>>,
    results: Vec<(SessionToken, RttResult)>,
) -> Vec<RttResult> {
    let mut revoked = match revoked.lock() {
        Ok(revoked) => revoked,
        Err(e) => {
            error!("The revoked set is poisoned: {:?}", e);
            return results.into_iter().map(|(_, result)| result).collect();
        }
    };

    results
        .into_iter()
        .filter_map(|(token, result)| {
            if !revoked.contains(&token) {
                return Some(result);
            }
            match result.status {
                RttStatus::Aborted => {
                    revoked.remove(&token);
                    Some(result)
                }
                _ => {
                    debug!("Drop the revoked result {} of {}", result.measurement_num, result.addr);
                    None
                }
            }
        })
        .collect()
}

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

//! This module defines the CapabilityStore, the static ranging capabilities of the local radio
//! interfaces.

use std::collections::BTreeMap;

use log::error;

use crate::error::{Error, Result};
use crate::params::rtt_packets::{InterfaceHandle, RttCapabilities};

/// The ranging capabilities reported by each radio interface. The store is filled once when it
/// is built, and is read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct CapabilityStore {
    capabilities: BTreeMap<InterfaceHandle, RttCapabilities>,
}

impl CapabilityStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register the capabilities of the interface |iface|.
    pub fn with_interface(mut self, iface: InterfaceHandle, capabilities: RttCapabilities) -> Self {
        self.capabilities.insert(iface, capabilities);
        self
    }

    /// Query the capabilities of the interface |iface|.
    pub fn query(&self, iface: InterfaceHandle) -> Result<RttCapabilities> {
        self.capabilities.get(&iface).copied().ok_or_else(|| {
            error!("Unknown interface handle {}", iface);
            Error::HardwareUnavailable
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query() {
        let caps = RttCapabilities { one_sided_supported: true, ..Default::default() };
        let store = CapabilityStore::new().with_interface(3, caps);

        assert_eq!(store.query(3), Ok(caps));
        assert_eq!(store.query(4), Err(Error::HardwareUnavailable));
    }
}

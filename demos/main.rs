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

//! A simple example for the usage of the wifi_rtt_core library.

use log::{debug, info};

use wifi_rtt_core::driver::NopDriverGateway;
use wifi_rtt_core::error::{Error as RttError, RejectReason, Result as RttResult};
use wifi_rtt_core::params::{
    ChannelInfo, ChannelWidth, MacAddress, PeerType, RequestId, RttCapabilities, RttConfigBuilder,
    RttResult as RangingResult,
};
use wifi_rtt_core::service::RttServiceBuilder;
use wifi_rtt_core::session::CapabilityStore;

const IFACE: u32 = 0;

fn main() {
    env_logger::init();

    let capabilities = RttCapabilities {
        one_sided_supported: true,
        eleven_v_supported: false,
        ftm_supported: true,
    };
    // Initialize the RTT service.
    let service = RttServiceBuilder::new()
        .driver_gateway(NopDriverGateway {})
        .capability_store(CapabilityStore::new().with_interface(IFACE, capabilities))
        .build()
        .unwrap();

    let config = RttConfigBuilder::new()
        .addr(MacAddress::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]))
        .peer_type(PeerType::Ap)
        .channel(ChannelInfo::new(ChannelWidth::Width80, 5180, 5210))
        .build()
        .unwrap();
    let handler = |id: RequestId, results: Vec<RangingResult>| {
        for result in results.iter() {
            info!(
                "Request {}: {} at {:?} cm, {:?}",
                id, result.addr, result.distance_cm, result.status
            );
        }
    };
    let result: RttResult<()> = service.submit(1, IFACE, vec![config], handler);

    // Enumerate the error code for backward-compatibility.
    // WARNING: Modifying or removing the current fields are prohibited in general,
    // unless we could confirm that there is no client using the modified field.
    if let Err(err) = result {
        match err {
            RttError::BatchRejected(RejectReason::DuplicatedRequestId) => {}
            RttError::BatchRejected(RejectReason::EmptyBatch) => {}
            RttError::BatchRejected(RejectReason::DuplicatedPeerInBatch) => {}
            RttError::BatchRejected(RejectReason::MissingChannelInfo) => {}
            RttError::BatchRejected(RejectReason::UnsupportedMode) => {}
            RttError::BatchRejected(RejectReason::PeerBusy) => {}
            RttError::BatchRejected(RejectReason::MaxSessionsExceeded) => {}
            RttError::BatchRejected(RejectReason::InvalidChannelMap) => {}
            RttError::HardwareUnavailable => {}
            RttError::Timeout => {}
            RttError::Unknown => {}

            // RttError is non_exhaustive so we need to add a wild branch here.
            // With this wild branch, adding a new enum field doesn't break the build.
            _ => debug!("Received unknown error: {:?}", err),
        }
    }

    let _ = service.cancel(1, vec![]);
    let _ = service.close();
}

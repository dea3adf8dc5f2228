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

//! This module defines the error type and the result type for this library.

/// The reason why a ranging batch or a channel map request is rejected at admission.
#[derive(Clone, Copy, Debug, thiserror::Error, PartialEq, Eq)]
pub enum RejectReason {
    /// The request identifier is associated with an active batch.
    #[error("The request identifier is already in use")]
    DuplicatedRequestId,
    /// The batch doesn't contain any config.
    #[error("The batch is empty")]
    EmptyBatch,
    /// The same peer address appears more than once in the batch.
    #[error("Duplicated peer address in the batch")]
    DuplicatedPeerInBatch,
    /// The peer type requires channel information that is missing or incomplete.
    #[error("Channel information is missing")]
    MissingChannelInfo,
    /// The requested ranging mode is not supported by the radio.
    #[error("The ranging mode is not supported")]
    UnsupportedMode,
    /// The peer is already ranged by another active batch.
    #[error("The peer is already ranged by another request")]
    PeerBusy,
    /// Admitting the batch would exceed the maximum number of active sessions.
    #[error("The maximum number of sessions has been reached")]
    MaxSessionsExceeded,
    /// The channel map or its broadcast duration is invalid.
    #[error("Invalid channel map")]
    InvalidChannelMap,
}

/// The error type for the wifi_rtt_core library.
#[non_exhaustive] // Adding new enum fields doesn't break the downstream build.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The request is rejected as a whole. No state is created.
    #[error("The request is rejected: {0}")]
    BatchRejected(RejectReason),
    /// The radio interface is invalid or the driver cannot be reached.
    #[error("The hardware is unavailable")]
    HardwareUnavailable,
    /// The driver doesn't respond in timeout.
    #[error("The driver doesn't respond in timeout")]
    Timeout,
    /// The unknown error.
    #[error("The unknown error")]
    Unknown,

    /// The result of the mock method is not assigned
    #[cfg(any(test, feature = "mock-utils"))]
    #[error("The result of the mock method is not assigned")]
    MockUndefined,
}

impl From<RejectReason> for Error {
    fn from(reason: RejectReason) -> Self {
        Error::BatchRejected(reason)
    }
}

/// The result type for the wifi_rtt_core library.
///
/// This type is broadly used by the methods in this library which may produce an error.
pub type Result<T> = std::result::Result<T, Error>;

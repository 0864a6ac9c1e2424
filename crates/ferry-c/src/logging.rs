// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization for the ferry C FFI.

use crate::FerryError;

/// Log level for ferry logging.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FerryLogLevel {
    FerryLogOff = 0,
    FerryLogError = 1,
    FerryLogWarn = 2,
    FerryLogInfo = 3,
    FerryLogDebug = 4,
    FerryLogTrace = 5,
}

impl From<FerryLogLevel> for log::LevelFilter {
    fn from(level: FerryLogLevel) -> Self {
        match level {
            FerryLogLevel::FerryLogOff => log::LevelFilter::Off,
            FerryLogLevel::FerryLogError => log::LevelFilter::Error,
            FerryLogLevel::FerryLogWarn => log::LevelFilter::Warn,
            FerryLogLevel::FerryLogInfo => log::LevelFilter::Info,
            FerryLogLevel::FerryLogDebug => log::LevelFilter::Debug,
            FerryLogLevel::FerryLogTrace => log::LevelFilter::Trace,
        }
    }
}

/// Initialize ferry logging with console output.
///
/// Returns `FerryOperationFailed` if a logger was already installed.
///
/// # Safety
/// Must be called from a single thread during initialization.
#[no_mangle]
pub unsafe extern "C" fn ferry_logging_init(level: FerryLogLevel) -> FerryError {
    let filter: log::LevelFilter = level.into();

    match env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp_millis()
        .try_init()
    {
        Ok(()) => FerryError::FerryOk,
        Err(_) => FerryError::FerryOperationFailed,
    }
}

// Copyright 2026 Kargo Takip Contributors
// SPDX-License-Identifier: Apache-2.0

//! Kargo Takip — track Turkish parcel carriers through their public
//! tracking pages.
//!
//! The carriers covered here publish no tracking API. This crate renders
//! their public pages in headless Chromium, reads the result out of the
//! markup, and normalizes it into one envelope shape regardless of
//! carrier or outcome.
//!
//! ```no_run
//! use kargo_takip::CargoTracker;
//!
//! # async fn demo() {
//! let tracker = CargoTracker::new();
//! let result = tracker.track_aras("1234567890123").await;
//! if result.success {
//!     println!("{:?}", result.data);
//! }
//! let _ = tracker.close().await;
//! # }
//! ```

pub mod browser;
pub mod cli;
pub mod error;
pub mod model;
pub mod provider;
pub mod registry;
pub mod stealth;

pub use error::TrackError;
pub use model::{
    CargoInfo, FailureReason, MovementInfo, ServiceInfo, TrackingResult, TrackingStatus,
};
pub use provider::CargoProvider;
pub use registry::CargoTracker;

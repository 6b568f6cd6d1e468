// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod alerts;
pub mod checklists;
pub mod feed;
pub mod notifications;
pub mod poller;
pub mod push;
pub mod users;

pub use feed::GdacsClient;
pub use poller::{AlertPoller, CycleSummary};
pub use push::{ExpoPushClient, PushSender};

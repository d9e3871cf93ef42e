// SPDX-License-Identifier: MIT OR Apache-2.0
//! Services shared by the winbridge core: settings loading and portable MIME data.

pub mod mime_data;
pub mod settings;

pub use mime_data::{MimeData, MimeDataError};
pub use settings::{Config, SettingsError, SettingsRegistry};

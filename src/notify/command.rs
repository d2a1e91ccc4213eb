//! Wire format of the radio notification.
//!
//! A notification `person` at 75% travels as the line
//! `AT+DTRX=1,2,18,706572736f6e2c3735\n`: the UTF-8 payload `person,75`
//! hex-encoded, prefixed by its hex character count.

use serde::{Deserialize, Serialize};

use crate::engine::BurstSummary;

/// AT command that transmits a data frame through the radio module
pub const AT_COMMAND: &str = "AT+DTRX";

/// Fixed leading arguments of the transmit command
pub const DTRX_HEADER: &str = "1,2";

pub const LINE_TERMINATOR: &str = "\n";

/// Compact notification sent once per burst that crosses the threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCommand {
    pub label: String,
    /// Whole percentage, 0..=100
    pub confidence_percent: u8,
}

impl NotificationCommand {
    pub fn new(label: impl Into<String>, confidence_percent: u8) -> Self {
        Self {
            label: label.into(),
            confidence_percent: confidence_percent.min(100),
        }
    }

    pub fn from_summary(summary: &BurstSummary) -> Self {
        let percent = (summary.mean_confidence * 100.0).round().clamp(0.0, 100.0) as u8;
        Self::new(summary.dominant_label.clone(), percent)
    }

    /// `<label>,<confidence_percent>`
    pub fn payload(&self) -> String {
        format!("{},{}", self.label, self.confidence_percent)
    }

    /// Full AT command line, without the terminator
    pub fn encode(&self) -> String {
        encode_payload(&self.payload())
    }
}

/// Hex-encode a payload and wrap it in the transmit command
pub fn encode_payload(payload: &str) -> String {
    let hex_payload = hex::encode(payload.as_bytes());
    format!(
        "{}={},{},{}",
        AT_COMMAND,
        DTRX_HEADER,
        hex_payload.len(),
        hex_payload
    )
}

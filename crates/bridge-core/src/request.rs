//! Forced-pairing requests.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::phone::Phone;

/// A directed request that two people be paired once they have been
/// present together for enough consecutive batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialRequest {
    pub requester_phone: Phone,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub requested_phone: Option<Phone>,
    #[serde(default)]
    pub requested_name: Option<String>,
    #[serde(default)]
    pub consecutive_co_presence_count: u32,
    #[serde(default)]
    pub fulfilled: bool,
}

impl SpecialRequest {
    /// Identity used when merging re-ingested requests.
    pub fn identity(&self) -> RequestIdentity {
        RequestIdentity {
            requester_phone: self.requester_phone.clone(),
            requested_phone: self.requested_phone.clone(),
        }
    }

    /// Label for logs and previews.
    pub fn label(&self) -> String {
        format!(
            "{} -> {}",
            self.requester_name,
            self.requested_name.as_deref().unwrap_or("?")
        )
    }
}

/// `(requester_phone, requested_phone)` pair identifying a request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestIdentity {
    pub requester_phone: Phone,
    pub requested_phone: Option<Phone>,
}

/// Raw request tuple as supplied by the ingestion collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialRequestEntry {
    pub requester_phone: String,
    pub requester_name: String,
    pub requested_phone: Option<String>,
    pub requested_name: Option<String>,
}

impl SpecialRequestEntry {
    /// Normalizes the phones into a fresh, unfulfilled request.
    pub fn parse(self) -> Result<SpecialRequest> {
        Ok(SpecialRequest {
            requester_phone: Phone::parse(&self.requester_phone)?,
            requester_name: self.requester_name.trim().to_string(),
            requested_phone: Phone::parse_optional(self.requested_phone.as_deref())?,
            requested_name: self
                .requested_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            consecutive_co_presence_count: 0,
            fulfilled: false,
        })
    }
}

use crate::error::{Result, WorkflowError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wire value of the status that clears a ticket for payment.
pub const PROCEED_TO_PAYMENT: &str = "proceed to payment";

/// Workflow state of a submitted document.
///
/// Staff may set any non-blank label. Labels the workflow knows about map to
/// named variants; everything else is carried verbatim as [`TicketStatus::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TicketStatus {
    /// Submitted by the applicant and not yet reviewed. Serialized as `null`.
    #[default]
    Submitted,
    UnderReview,
    InfoRequested,
    Rejected,
    ProceedToPayment,
    Custom(String),
}

impl TicketStatus {
    /// Parses a status label set by staff. Blank labels are rejected.
    pub fn parse(label: &str) -> Result<Self> {
        if label.trim().is_empty() {
            return Err(WorkflowError::ValidationError(
                "Status must not be blank".to_string(),
            ));
        }
        Ok(match label {
            "under review" => TicketStatus::UnderReview,
            "info requested" => TicketStatus::InfoRequested,
            "rejected" => TicketStatus::Rejected,
            PROCEED_TO_PAYMENT => TicketStatus::ProceedToPayment,
            other => TicketStatus::Custom(other.to_string()),
        })
    }

    /// Status read back from storage; missing or blank means the initial state.
    pub fn from_stored(label: Option<&str>) -> Self {
        label
            .and_then(|label| Self::parse(label).ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Submitted => "",
            TicketStatus::UnderReview => "under review",
            TicketStatus::InfoRequested => "info requested",
            TicketStatus::Rejected => "rejected",
            TicketStatus::ProceedToPayment => PROCEED_TO_PAYMENT,
            TicketStatus::Custom(label) => label,
        }
    }

    /// The status as reported to callers: `None` while still in the initial state.
    pub fn reported(&self) -> Option<&TicketStatus> {
        match self {
            TicketStatus::Submitted => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for TicketStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TicketStatus::Submitted => serializer.serialize_none(),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_stored(label.as_deref()))
    }
}

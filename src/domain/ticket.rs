use crate::domain::ports::TicketGenerator;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of generated ticket numbers.
pub const TICKET_LENGTH: usize = 8;

const TICKET_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Public-facing identifier of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(String);

impl TicketNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Interprets a caller-supplied ticket; blank input means "none supplied".
    pub fn from_input(value: Option<&str>) -> Option<Self> {
        value
            .map(str::trim)
            .filter(|ticket| !ticket.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Draws ticket numbers from the thread-local PRNG.
///
/// Not cryptographically secure. Uniqueness is enforced by the store, not here.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTicketGenerator;

impl RandomTicketGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TicketGenerator for RandomTicketGenerator {
    fn generate(&self) -> TicketNumber {
        let mut rng = rand::thread_rng();
        let ticket: String = (0..TICKET_LENGTH)
            .map(|_| TICKET_CHARSET[rng.gen_range(0..TICKET_CHARSET.len())] as char)
            .collect();
        TicketNumber(ticket)
    }
}

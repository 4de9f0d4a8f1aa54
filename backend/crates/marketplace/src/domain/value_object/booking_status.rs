//! Booking Status
//!
//! Provider-driven transitions:
//!
//! ```text
//! PENDING ──► CONFIRMED ──► IN_PROGRESS ──► COMPLETED
//!    │            └──────────────────────────►┘
//!    └──► REJECTED
//! ```
//!
//! Customers may only cancel, and only from PENDING or CONFIRMED.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum BookingStatus {
    #[default]
    Pending = 0,
    Confirmed = 1,
    InProgress = 2,
    Completed = 3,
    Cancelled = 4,
    Rejected = 5,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Rejected,
    ];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use BookingStatus::*;
        match self {
            Pending => "PENDING",
            Confirmed => "CONFIRMED",
            InProgress => "IN_PROGRESS",
            Completed => "COMPLETED",
            Cancelled => "CANCELLED",
            Rejected => "REJECTED",
        }
    }

    /// Lower-case wording for messages
    pub const fn label(&self) -> &'static str {
        use BookingStatus::*;
        match self {
            Pending => "pending",
            Confirmed => "confirmed",
            InProgress => "in progress",
            Completed => "completed",
            Cancelled => "cancelled",
            Rejected => "rejected",
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Whether the provider may move a booking from `self` to `next`
    pub const fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Rejected)
                | (Confirmed, InProgress)
                | (Confirmed, Completed)
                | (InProgress, Completed)
        )
    }

    pub const fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Still occupying the provider; blocks deleting the service
    pub const fn is_open(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::InProgress
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_allowed_transitions() {
        let allowed: Vec<_> = BookingStatus::ALL
            .iter()
            .flat_map(|from| {
                BookingStatus::ALL
                    .iter()
                    .filter(|to| from.can_transition_to(**to))
                    .map(move |to| (*from, *to))
            })
            .collect();

        assert_eq!(
            allowed,
            vec![
                (Pending, Confirmed),
                (Pending, Rejected),
                (Confirmed, InProgress),
                (Confirmed, Completed),
                (InProgress, Completed),
            ]
        );
    }

    #[test]
    fn test_terminal_states_are_closed() {
        for terminal in [Completed, Cancelled, Rejected] {
            assert!(!terminal.is_open());
            assert!(!terminal.is_cancellable());
        }
        assert!(Pending.is_cancellable());
        assert!(Confirmed.is_cancellable());
        assert!(!InProgress.is_cancellable());
    }

    #[test]
    fn test_codes() {
        assert_eq!(BookingStatus::from_code("in_progress"), Some(InProgress));
        assert_eq!(BookingStatus::from_id(5), Some(Rejected));
        assert_eq!(BookingStatus::from_id(6), None);
        assert_eq!(
            serde_json::to_value(InProgress).unwrap(),
            serde_json::json!("IN_PROGRESS")
        );
    }
}

//! Status badge presentation.

use serde::Serialize;

use crate::models::{AppointmentStatus, ColorToken, IconKind};

/// Display attributes for an appointment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub color: ColorToken,
    pub icon: IconKind,
}

const CONFIRMED: StatusBadge = StatusBadge {
    label: "Confirmed",
    color: ColorToken::Green,
    icon: IconKind::Check,
};

const PENDING: StatusBadge = StatusBadge {
    label: "Pending",
    color: ColorToken::Yellow,
    icon: IconKind::Clock,
};

const CANCELLED: StatusBadge = StatusBadge {
    label: "Cancelled",
    color: ColorToken::Red,
    icon: IconKind::Alert,
};

/// Map a status to its badge. Unrecognized statuses use the pending badge.
pub fn classify(status: &AppointmentStatus) -> StatusBadge {
    match status {
        AppointmentStatus::Confirmed => CONFIRMED,
        AppointmentStatus::Pending => PENDING,
        AppointmentStatus::Cancelled => CANCELLED,
        AppointmentStatus::Other(raw) => {
            tracing::debug!(status = %raw, "Unrecognized appointment status, showing as pending");
            PENDING
        }
    }
}

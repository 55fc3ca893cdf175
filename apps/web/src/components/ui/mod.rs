mod alert;
mod button;
mod spinner;
mod stat_card;
mod status_badge;

pub(crate) use alert::{Alert, AlertKind};
pub(crate) use button::Button;
pub(crate) use spinner::Spinner;
pub(crate) use stat_card::StatCard;
pub(crate) use status_badge::StatusBadge;

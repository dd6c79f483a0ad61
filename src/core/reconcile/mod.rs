//! C3 (User Reconciler), C4 (Grant Applier) and C5 (Checkin Assembler).

pub mod checkin;
pub mod grant;
pub mod user;

//! Session Gate: login, logout and the per-session context.

pub mod gate;

pub use gate::{DashboardSession, LoginGrant, SessionGate, SessionHandle, SessionToken};

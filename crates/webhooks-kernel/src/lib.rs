//! Business rules behind the chatbot's webhook tags. Everything here works on the
//! session parameter bag and plain data; talking to external services is the
//! server's job.

pub mod address;
pub mod bulky_waste;
pub mod debts;
pub mod eligibility;
pub mod lighting;
pub mod materials;
pub mod params;
pub mod session;
pub mod tickets;
pub mod validation;

pub use params::{ParamError, ParamsExt, SessionParameters};

mod audit;
mod nop;

pub use audit::{Audit, AuditOption};
pub use nop::Nop;

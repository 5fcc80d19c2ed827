//! Match notification dispatch.
//!
//! - [`message`] - renders one outgoing text per record member
//! - [`gateway`] - the [`MessageGateway`] seam plus outbox and dry-run gateways
//! - [`dispatch()`] - sends a batch sequentially, collecting per-recipient results
//!
//! Dispatch never touches matching state; the only state change is the
//! batch's dispatch timestamp, and only for non-redirected sends.

pub mod dispatch;
pub mod gateway;
pub mod message;

pub use dispatch::{append_failure_log, dispatch, DispatchOptions, DispatchReport, FailedSend};
pub use gateway::{DryRunGateway, GatewayError, MessageGateway, OutboxGateway, OutboxLine};
pub use message::{messages_for, Outgoing};

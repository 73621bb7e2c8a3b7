//! Chat interaction: validating input, recording it and fetching replies.
//!
//! A send moves through `Idle -> Validating -> Sending -> Completed | Failed`.
//! [`ChatController::submit`] covers validation and records the user message;
//! the returned [`PendingReply`] performs the outbound call and records the
//! bot message. [`ChatController::send`] does both in one step.

mod controller;

pub use controller::{
    ChatController, EMPTY_REPLY_TEXT, PendingReply, SendOutcome, SendReport, SendStatus,
    UNREACHABLE_TEXT,
};

//! Read model definitions.

pub mod assignment;
pub mod payment;
pub mod preference;
pub mod room;
pub mod room_request;

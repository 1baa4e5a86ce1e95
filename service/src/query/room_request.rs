//! [`Query`] collection related to a single [`RoomRequest`].

use common::operations::By;

use crate::domain::{room_request, RoomRequest};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`RoomRequest`] by its [`room_request::Id`].
pub type ById = DatabaseQuery<By<Option<RoomRequest>, room_request::Id>>;

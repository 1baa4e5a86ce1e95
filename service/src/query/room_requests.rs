//! [`Query`] collection related to [`RoomRequest`]s listing.

use common::operations::By;

use crate::read::room_request::list;
#[cfg(doc)]
use crate::{domain::RoomRequest, Query};

use super::DatabaseQuery;

/// Queries a [`list::Page`] of [`RoomRequest`]s with their context.
pub type List = DatabaseQuery<By<list::Page, list::Selector>>;

//! [`Query`] collection related to [`Room`]s listing.

use common::operations::By;

use crate::read::room::list;
#[cfg(doc)]
use crate::{domain::Room, Query};

use super::DatabaseQuery;

/// Queries a [`list::Page`] of [`Room`]s.
pub type List = DatabaseQuery<By<list::Page, list::Selector>>;

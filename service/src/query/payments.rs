//! [`Query`] collection related to [`Payment`]s listing.

use common::operations::By;

use crate::read::payment::list;
#[cfg(doc)]
use crate::{domain::Payment, Query};

use super::DatabaseQuery;

/// Queries a [`list::Page`] of [`Payment`]s.
pub type List = DatabaseQuery<By<list::Page, list::Selector>>;

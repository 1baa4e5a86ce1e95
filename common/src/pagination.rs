//! Abstractions for offset pagination.

/// Arguments selecting a [`Page`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// 1-based number of the requested [`Page`].
    page: usize,

    /// Maximum number of items on the requested [`Page`].
    limit: usize,
}

impl Arguments {
    /// Default [`limit`] applied when none is requested.
    ///
    /// [`limit`]: Arguments::limit
    pub const DEFAULT_LIMIT: usize = 10;

    /// Maximum allowed [`limit`].
    ///
    /// [`limit`]: Arguments::limit
    pub const MAX_LIMIT: usize = 100;

    /// Creates a new [`Arguments`], normalizing out-of-range values.
    ///
    /// A zero or missing `page` becomes the first one, a zero or missing
    /// `limit` becomes [`DEFAULT_LIMIT`], and `limit` is capped at
    /// [`MAX_LIMIT`].
    ///
    /// [`DEFAULT_LIMIT`]: Arguments::DEFAULT_LIMIT
    /// [`MAX_LIMIT`]: Arguments::MAX_LIMIT
    #[must_use]
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Returns 1-based number of the requested [`Page`].
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns maximum number of items on the requested [`Page`].
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns number of items to skip before the requested [`Page`].
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of items.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// Total number of items across all [`Page`]s.
    pub total: usize,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] from the provided items.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = impl Into<I>>,
        total: usize,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            total,
            arguments,
        }
    }

    /// Returns total number of [`Page`]s.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.arguments.limit())
    }

    /// Maps items of this [`Page`] into another type.
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            arguments: self.arguments,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Page};

    #[test]
    fn arguments_normalize() {
        let args = Arguments::new(None, None);
        assert_eq!(args.page(), 1);
        assert_eq!(args.limit(), Arguments::DEFAULT_LIMIT);
        assert_eq!(args.offset(), 0);

        let args = Arguments::new(Some(0), Some(0));
        assert_eq!(args.page(), 1);
        assert_eq!(args.limit(), Arguments::DEFAULT_LIMIT);

        let args = Arguments::new(Some(3), Some(20));
        assert_eq!(args.offset(), 40);

        let args = Arguments::new(Some(1), Some(100_500));
        assert_eq!(args.limit(), Arguments::MAX_LIMIT);
    }

    #[test]
    fn page_counts() {
        let args = Arguments::new(Some(1), Some(10));
        let page = Page::<u8>::new(args, [1u8, 2, 3], 21);
        assert_eq!(page.total_pages(), 3);

        let page = Page::<u8>::new(args, Vec::<u8>::new(), 0);
        assert_eq!(page.total_pages(), 0);
    }
}

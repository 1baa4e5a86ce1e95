//! [`Preference`] definitions.

use crate::domain::{amenity, room, user};
#[cfg(doc)]
use crate::domain::{Room, Student, User};

/// Housing preferences declared by a [`User`].
///
/// Consulted only for matching [`Student`]s with [`Room`]s, never enforced.
#[derive(Clone, Debug)]
pub struct Preference {
    /// ID of the [`User`] these preferences belong to.
    pub user_id: user::Id,

    /// Preferred [`room::Kind`], if declared.
    pub room_kind: Option<room::Kind>,

    /// IDs of [`amenity::Amenity`]s the [`User`] wants, if declared.
    pub amenities: Vec<amenity::Id>,
}

impl Preference {
    /// Creates a new empty [`Preference`] record for the provided [`User`].
    #[must_use]
    pub fn empty(user_id: user::Id) -> Self {
        Self {
            user_id,
            room_kind: None,
            amenities: Vec::new(),
        }
    }

    /// Checks whether this [`Preference`] matches a [`Room`] of the provided
    /// kind and amenity set.
    ///
    /// The predicate is intentionally asymmetric about undeclared values:
    /// - a [`room::Kind`] declared on only one side is permissive, declared
    ///   on both sides it must be equal;
    /// - amenities declared on either side require an overlap, so a declared
    ///   side against an undeclared one never matches;
    /// - when neither side declares anything at all, there is nothing to
    ///   match on and the result is negative.
    #[must_use]
    pub fn matches(
        &self,
        room_kind: Option<room::Kind>,
        room_amenities: &[amenity::Id],
    ) -> bool {
        if let (Some(kind), Some(preferred)) = (room_kind, self.room_kind) {
            if kind != preferred {
                return false;
            }
        }

        match (room_amenities.is_empty(), self.amenities.is_empty()) {
            (false, false) => {
                if !room_amenities
                    .iter()
                    .any(|id| self.amenities.contains(id))
                {
                    return false;
                }
            }
            (false, true) | (true, false) => return false,
            (true, true) => {}
        }

        if room_kind.is_none()
            && self.room_kind.is_none()
            && self.amenities.is_empty()
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod spec {
    use super::{amenity, room, user, Preference};

    fn preference(
        room_kind: Option<room::Kind>,
        amenities: Vec<amenity::Id>,
    ) -> Preference {
        Preference {
            user_id: user::Id::new(),
            room_kind,
            amenities,
        }
    }

    #[test]
    fn declared_kinds_must_agree() {
        let pref = preference(Some(room::Kind::Single), vec![]);
        assert!(!pref.matches(Some(room::Kind::Shared), &[]));
        assert!(pref.matches(Some(room::Kind::Single), &[]));
    }

    #[test]
    fn undeclared_kind_is_permissive_on_either_side() {
        let pref = preference(None, vec![]);
        // The room declares a kind, the student does not: no clause excludes
        // the match, even though the student declared nothing else either.
        assert!(pref.matches(Some(room::Kind::Single), &[]));

        let pref = preference(Some(room::Kind::Shared), vec![]);
        assert!(pref.matches(None, &[]));
    }

    #[test]
    fn amenities_require_overlap_when_declared() {
        let wifi = amenity::Id::new();
        let laundry = amenity::Id::new();
        let gym = amenity::Id::new();

        let pref = preference(None, vec![wifi, laundry]);
        assert!(pref.matches(None, &[laundry, gym]));
        assert!(!pref.matches(None, &[gym]));
    }

    #[test]
    fn one_sided_amenities_never_match() {
        let wifi = amenity::Id::new();

        let pref = preference(Some(room::Kind::Shared), vec![]);
        assert!(!pref.matches(Some(room::Kind::Shared), &[wifi]));

        let pref = preference(Some(room::Kind::Shared), vec![wifi]);
        assert!(!pref.matches(Some(room::Kind::Shared), &[]));
    }

    #[test]
    fn nothing_declared_anywhere_is_no_match() {
        let pref = preference(None, vec![]);
        assert!(!pref.matches(None, &[]));
    }
}

//! [`Room`] definitions.

use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use common::DateTime;

use crate::domain::{amenity, building};

/// Dormitory room.
#[derive(Clone, Debug)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// Human-readable [`Number`] of this [`Room`], unique across all
    /// [`Room`]s.
    pub number: Number,

    /// ID of the [`building::Building`] this [`Room`] is located in, if known.
    pub building_id: Option<building::Id>,

    /// Floor this [`Room`] is located on, if known.
    pub floor: Option<Floor>,

    /// [`Kind`] of this [`Room`].
    pub kind: Kind,

    /// Total number of beds in this [`Room`].
    pub total_beds: Beds,

    /// Number of beds not occupied at the moment.
    ///
    /// The single source of truth for occupancy: `total_beds -
    /// available_beds` is the number of active assignments in this [`Room`].
    pub available_beds: Beds,

    /// Current [`Status`] of this [`Room`].
    ///
    /// Recomputed from the bed counters on every capacity-affecting write via
    /// [`Room::apply_capacity_delta()`]; [`Status::Maintenance`] is the only
    /// independently settable value.
    pub status: Status,

    /// Price of the whole [`Room`], required for [`Kind::Single`] rooms.
    pub room_price: Option<Money>,

    /// Price of a single bed, required for [`Kind::Shared`] rooms.
    pub bed_price: Option<Money>,

    /// [`Description`] of this [`Room`].
    pub description: Option<Description>,

    /// [`ImageUrl`]s of this [`Room`] photos.
    pub images: Vec<ImageUrl>,

    /// IDs of [`amenity::Amenity`]s this [`Room`] offers.
    pub amenities: Vec<amenity::Id>,

    /// [`DateTime`] when this [`Room`] was created.
    pub created_at: CreationDateTime,
}

impl Room {
    /// Adjusts [`available_beds`] by the provided `delta` and recomputes the
    /// [`Status`].
    ///
    /// This is the only way capacity may be mutated: every workflow placing a
    /// student into (or releasing one from) this [`Room`] goes through here,
    /// so the `0 ..= total_beds` bound is checked in a single place.
    ///
    /// A [`Status::Maintenance`] override is left intact.
    ///
    /// # Errors
    ///
    /// With [`CapacityError`] if the `delta` would leave [`available_beds`]
    /// outside `0 ..= total_beds`.
    ///
    /// [`available_beds`]: Room::available_beds
    pub fn apply_capacity_delta(
        &mut self,
        delta: i32,
    ) -> Result<(), CapacityError> {
        let available = i32::from(self.available_beds) + delta;
        if available < 0 || available > i32::from(self.total_beds) {
            return Err(CapacityError {
                available: self.available_beds,
                total: self.total_beds,
                delta,
            });
        }

        self.available_beds =
            Beds::try_from(available).unwrap_or_else(|_| {
                unreachable!("`available` is within `Beds` bounds")
            });
        if self.status != Status::Maintenance {
            self.status = Status::derive(self.available_beds, self.total_beds);
        }

        Ok(())
    }

    /// Sets or clears the [`Status::Maintenance`] override.
    ///
    /// Clearing returns the [`Status`] to its occupancy-derived value.
    pub fn set_maintenance(&mut self, maintenance: bool) {
        self.status = if maintenance {
            Status::Maintenance
        } else {
            Status::derive(self.available_beds, self.total_beds)
        };
    }

    /// Returns the price a single occupant of this [`Room`] is due: the whole
    /// [`room_price`] for a [`Kind::Single`] room, or the [`bed_price`] for a
    /// [`Kind::Shared`] one.
    ///
    /// [`bed_price`]: Room::bed_price
    /// [`room_price`]: Room::room_price
    #[must_use]
    pub fn price_per_occupant(&self) -> Option<Money> {
        match self.kind {
            Kind::Single => self.room_price,
            Kind::Shared => self.bed_price,
        }
    }

    /// Checks the pricing invariants of a [`Room`]: a [`Kind::Single`] room
    /// has exactly 1 bed and a [`room_price`], a [`Kind::Shared`] room has a
    /// [`bed_price`].
    ///
    /// # Errors
    ///
    /// With [`PricingError`] if any of the invariants is violated.
    ///
    /// [`bed_price`]: Room::bed_price
    /// [`room_price`]: Room::room_price
    pub fn check_pricing(
        kind: Kind,
        total_beds: Beds,
        room_price: Option<&Money>,
        bed_price: Option<&Money>,
    ) -> Result<(), PricingError> {
        use PricingError as E;

        match kind {
            Kind::Single => {
                if total_beds != 1 {
                    return Err(E::SingleRoomBedCount(total_beds));
                }
                if room_price.is_none() {
                    return Err(E::RoomPriceRequired);
                }
            }
            Kind::Shared => {
                if bed_price.is_none() {
                    return Err(E::BedPriceRequired);
                }
            }
        }

        Ok(())
    }
}

/// ID of a [`Room`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Human-readable number of a [`Room`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 64
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

/// Description of a [`Room`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 2048
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// URL of a [`Room`] photo.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        url.trim() == url && !url.is_empty() && url.len() <= 2048
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

/// Number of beds in a [`Room`].
pub type Beds = u16;

/// Floor a [`Room`] is located on.
pub type Floor = u16;

define_kind! {
    #[doc = "Kind of a [`Room`]."]
    enum Kind {
        #[doc = "A whole room for a single student."]
        Single = 1,

        #[doc = "A room shared by multiple students, priced per bed."]
        Shared = 2,
    }
}

define_kind! {
    #[doc = "Status of a [`Room`]."]
    enum Status {
        #[doc = "All beds are free."]
        Available = 1,

        #[doc = "Some, but not all, beds are occupied."]
        Occupied = 2,

        #[doc = "No free beds are left."]
        Reserved = 3,

        #[doc = "Admin-set override blocking new assignments."]
        Maintenance = 4,
    }
}

impl Status {
    /// Derives a [`Status`] from the bed counters of a [`Room`].
    #[must_use]
    pub fn derive(available: Beds, total: Beds) -> Self {
        if available == 0 {
            Self::Reserved
        } else if available < total {
            Self::Occupied
        } else {
            Self::Available
        }
    }
}

/// Error of violating the capacity bounds of a [`Room`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display(
    "capacity delta {delta} leaves `Room` outside `0..={total}` \
     (currently {available} available)"
)]
pub struct CapacityError {
    /// Number of available beds at the moment of the violation.
    pub available: Beds,

    /// Total number of beds.
    pub total: Beds,

    /// Rejected delta.
    pub delta: i32,
}

/// Error of violating the pricing invariants of a [`Room`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum PricingError {
    /// [`Kind::Single`] room with a bed count other than 1.
    #[display("single `Room` must have exactly 1 bed, not {_0}")]
    SingleRoomBedCount(#[error(not(source))] Beds),

    /// [`Kind::Single`] room without a [`Room::room_price`].
    #[display("single `Room` requires a room price")]
    RoomPriceRequired,

    /// [`Kind::Shared`] room without a [`Room::bed_price`].
    #[display("shared `Room` requires a bed price")]
    BedPriceRequired,
}

/// [`DateTime`] when a [`Room`] was created.
pub type CreationDateTime = DateTimeOf<(Room, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};

    use super::{Beds, Id, Kind, Number, Room, Status};

    fn room(kind: Kind, total: Beds, available: Beds) -> Room {
        Room {
            id: Id::new(),
            number: Number::new("101").unwrap(),
            building_id: None,
            floor: None,
            kind,
            total_beds: total,
            available_beds: available,
            status: Status::derive(available, total),
            room_price: Some(Money {
                amount: 500.into(),
                currency: Currency::Egp,
            }),
            bed_price: Some(Money {
                amount: 150.into(),
                currency: Currency::Egp,
            }),
            description: None,
            images: vec![],
            amenities: vec![],
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn status_derivation() {
        assert_eq!(Status::derive(2, 2), Status::Available);
        assert_eq!(Status::derive(1, 2), Status::Occupied);
        assert_eq!(Status::derive(0, 2), Status::Reserved);
        assert_eq!(Status::derive(1, 1), Status::Available);
        assert_eq!(Status::derive(0, 1), Status::Reserved);
    }

    #[test]
    fn capacity_delta_updates_status() {
        let mut room = room(Kind::Shared, 2, 2);

        room.apply_capacity_delta(-1).unwrap();
        assert_eq!(room.available_beds, 1);
        assert_eq!(room.status, Status::Occupied);

        room.apply_capacity_delta(-1).unwrap();
        assert_eq!(room.available_beds, 0);
        assert_eq!(room.status, Status::Reserved);

        assert!(room.apply_capacity_delta(-1).is_err());
        assert_eq!(room.available_beds, 0, "failed delta must not apply");

        room.apply_capacity_delta(1).unwrap();
        assert_eq!(room.status, Status::Occupied);

        room.apply_capacity_delta(1).unwrap();
        assert_eq!(room.status, Status::Available);

        assert!(room.apply_capacity_delta(1).is_err());
    }

    #[test]
    fn maintenance_survives_capacity_changes() {
        let mut room = room(Kind::Shared, 2, 2);

        room.set_maintenance(true);
        assert_eq!(room.status, Status::Maintenance);

        room.apply_capacity_delta(-1).unwrap();
        assert_eq!(room.status, Status::Maintenance);

        room.set_maintenance(false);
        assert_eq!(room.status, Status::Occupied);
    }

    #[test]
    fn pricing_invariants() {
        let price = Money {
            amount: 500.into(),
            currency: Currency::Egp,
        };

        assert!(Room::check_pricing(Kind::Single, 1, Some(&price), None)
            .is_ok());
        assert!(Room::check_pricing(Kind::Single, 2, Some(&price), None)
            .is_err());
        assert!(Room::check_pricing(Kind::Single, 1, None, None).is_err());
        assert!(Room::check_pricing(Kind::Shared, 4, None, Some(&price))
            .is_ok());
        assert!(Room::check_pricing(Kind::Shared, 4, None, None).is_err());
    }

    #[test]
    fn price_per_occupant_follows_kind() {
        let single = room(Kind::Single, 1, 1);
        assert_eq!(single.price_per_occupant(), single.room_price);

        let shared = room(Kind::Shared, 4, 4);
        assert_eq!(shared.price_per_occupant(), shared.bed_price);
    }
}

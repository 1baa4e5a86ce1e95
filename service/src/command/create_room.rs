//! [`Command`] for creating a new [`Room`].

use common::{
    operations::{By, Commit, Insert, Perform, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        amenity, building,
        notification::{self, Notify, Related, Target},
        room, Amenity, Building, Preference, Room,
    },
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Room`].
#[derive(Clone, Debug)]
pub struct CreateRoom {
    /// [`room::Number`] of the new [`Room`].
    ///
    /// Auto-assigned as the next free integer number when omitted.
    pub number: Option<room::Number>,

    /// ID of the [`Building`] the new [`Room`] is located in.
    pub building_id: Option<building::Id>,

    /// Floor the new [`Room`] is located on.
    pub floor: Option<room::Floor>,

    /// [`room::Kind`] of the new [`Room`].
    pub kind: room::Kind,

    /// Total number of beds in the new [`Room`].
    pub total_beds: room::Beds,

    /// Price of the whole [`Room`], required for single rooms.
    pub room_price: Option<Money>,

    /// Price of a single bed, required for shared rooms.
    pub bed_price: Option<Money>,

    /// [`room::Description`] of the new [`Room`].
    pub description: Option<room::Description>,

    /// [`room::ImageUrl`]s of the new [`Room`] photos.
    pub images: Vec<room::ImageUrl>,

    /// IDs of [`Amenity`]s the new [`Room`] offers.
    pub amenities: Vec<amenity::Id>,
}

impl<Db> Command<CreateRoom> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Building>, building::Id>>,
            Ok = Option<Building>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Amenity>, Vec<amenity::Id>>>,
            Ok = Vec<Amenity>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Preference>, read::preference::OfActiveStudents>>,
            Ok = Vec<Preference>,
            Err = Traced<database::Error>,
        > + Database<Perform<Notify>, Ok = (), Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<read::room::NextNumber, ()>>,
            Ok = read::room::NextNumber,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Room>, room::Number>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Insert<Room>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRoom {
            number,
            building_id,
            floor,
            kind,
            total_beds,
            room_price,
            bed_price,
            description,
            images,
            mut amenities,
        } = cmd;

        Room::check_pricing(
            kind,
            total_beds,
            room_price.as_ref(),
            bed_price.as_ref(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        if let Some(building_id) = building_id {
            self.database()
                .execute(Select(By::<Option<Building>, _>::new(building_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::BuildingNotExists(building_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        amenities.sort_unstable_by_key(|id| uuid::Uuid::from(*id));
        amenities.dedup();
        if !amenities.is_empty() {
            let known = self
                .database()
                .execute(Select(By::<Vec<Amenity>, _>::new(amenities.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if let Some(missing) = amenities
                .iter()
                .find(|id| !known.iter().any(|a| a.id == **id))
            {
                return Err(tracerr::new!(E::AmenityNotExists(*missing)));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let number = match number {
            Some(number) => {
                let occupied = tx
                    .execute(Select(By::<Option<Room>, _>::new(number.clone())))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if occupied.is_some() {
                    return Err(tracerr::new!(E::NumberOccupied(number)));
                }
                number
            }
            None => {
                let read::room::NextNumber(next) = tx
                    .execute(Select(By::<read::room::NextNumber, _>::new(())))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                // SAFETY: A decimal rendering of an integer is always a valid
                //         `room::Number`.
                #[expect(unsafe_code, reason = "invariants are preserved")]
                let number = unsafe {
                    room::Number::new_unchecked(next.to_string())
                };
                number
            }
        };

        let room = Room {
            id: room::Id::new(),
            number,
            building_id,
            floor,
            kind,
            total_beds,
            available_beds: total_beds,
            status: room::Status::derive(total_beds, total_beds),
            room_price,
            bed_price,
            description,
            images,
            amenities: amenities.clone(),
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Tell students whose declared preferences this `Room` matches.
        match self
            .database()
            .execute(Select(By::new(read::preference::OfActiveStudents)))
            .await
        {
            Ok(preferences) => {
                let matching = preferences
                    .into_iter()
                    .filter(|p: &Preference| {
                        p.matches(Some(room.kind), &room.amenities)
                    });
                for preference in matching {
                    super::notify(
                        self.database(),
                        Notify {
                            target: Target::User(preference.user_id),
                            kind: notification::Kind::RoomMatched,
                            title: "A room you may like appeared".to_owned(),
                            message: format!(
                                "Room {} matches your housing preferences",
                                room.number,
                            ),
                            related: Some(Related {
                                id: room.id.into(),
                                kind: notification::RelatedKind::Room,
                            }),
                        },
                    )
                    .await;
                }
            }
            Err(e) => {
                tracing::warn!("failed to match students for notifying: {e}");
            }
        }

        Ok(room)
    }
}

/// Error of [`CreateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// [`Building`] with the provided ID does not exist.
    #[display("`Building(id: {_0})` does not exist")]
    BuildingNotExists(#[error(not(source))] building::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`room::Number`] is already occupied by another [`Room`].
    #[display("`Room` number `{_0}` is already occupied")]
    NumberOccupied(#[error(not(source))] room::Number),

    /// Pricing invariants of the [`Room`] are violated.
    #[display("invalid `Room` pricing: {_0}")]
    #[from]
    Pricing(room::PricingError),
}

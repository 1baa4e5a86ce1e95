//! [`Command`] for updating a [`Room`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{amenity, building, room, Amenity, Building, Room},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Room`] by an admin.
///
/// Absent fields are left untouched. Bed counters stay consistent: resizing
/// recomputes [`Room::available_beds`] from the current occupancy and refuses
/// to drop the total below it.
#[derive(Clone, Debug, Default)]
pub struct UpdateRoom {
    /// ID of the [`Room`] to update.
    pub room_id: room::Id,

    /// New [`room::Number`].
    pub number: Option<room::Number>,

    /// New [`Building`] reference (`Some(None)` clears it).
    pub building_id: Option<Option<building::Id>>,

    /// New floor (`Some(None)` clears it).
    pub floor: Option<Option<room::Floor>>,

    /// New [`room::Kind`].
    pub kind: Option<room::Kind>,

    /// New total number of beds.
    pub total_beds: Option<room::Beds>,

    /// New price of the whole [`Room`] (`Some(None)` clears it).
    pub room_price: Option<Option<Money>>,

    /// New price of a single bed (`Some(None)` clears it).
    pub bed_price: Option<Option<Money>>,

    /// New [`room::Description`] (`Some(None)` clears it).
    pub description: Option<Option<room::Description>>,

    /// New photo [`room::ImageUrl`]s.
    pub images: Option<Vec<room::ImageUrl>>,

    /// New set of offered [`Amenity`] IDs.
    pub amenities: Option<Vec<amenity::Id>>,

    /// Maintenance override toggle: `Some(true)` blocks new assignments,
    /// `Some(false)` returns the status to its occupancy-derived value.
    pub maintenance: Option<bool>,
}

impl<Db> Command<UpdateRoom> for Service<Db>
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
        >,
    Transacted<Db>: Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Room>, room::Number>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Update<Room>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateRoom {
            room_id,
            number,
            building_id,
            floor,
            kind,
            total_beds,
            room_price,
            bed_price,
            description,
            images,
            amenities,
            maintenance,
        } = cmd;

        if let Some(Some(building_id)) = building_id {
            self.database()
                .execute(Select(By::<Option<Building>, _>::new(building_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::BuildingNotExists(building_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        let amenities = match amenities {
            Some(mut ids) => {
                ids.sort_unstable_by_key(|id| uuid::Uuid::from(*id));
                ids.dedup();
                if !ids.is_empty() {
                    let known = self
                        .database()
                        .execute(Select(By::<Vec<Amenity>, _>::new(
                            ids.clone(),
                        )))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?;
                    if let Some(missing) = ids
                        .iter()
                        .find(|id| !known.iter().any(|a| a.id == **id))
                    {
                        return Err(tracerr::new!(E::AmenityNotExists(
                            *missing
                        )));
                    }
                }
                Some(ids)
            }
            None => None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut room = tx
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        if let Some(number) = number {
            if number != room.number {
                let occupied = tx
                    .execute(Select(By::<Option<Room>, _>::new(
                        number.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if occupied.is_some() {
                    return Err(tracerr::new!(E::NumberOccupied(number)));
                }
                room.number = number;
            }
        }

        if let Some(total_beds) = total_beds {
            let occupied = room.total_beds - room.available_beds;
            if total_beds < occupied {
                return Err(tracerr::new!(E::BedsBelowOccupancy {
                    requested: total_beds,
                    occupied,
                }));
            }
            room.total_beds = total_beds;
            room.available_beds = total_beds - occupied;
        }

        if let Some(kind) = kind {
            room.kind = kind;
        }
        if let Some(building_id) = building_id {
            room.building_id = building_id;
        }
        if let Some(floor) = floor {
            room.floor = floor;
        }
        if let Some(room_price) = room_price {
            room.room_price = room_price;
        }
        if let Some(bed_price) = bed_price {
            room.bed_price = bed_price;
        }
        if let Some(description) = description {
            room.description = description;
        }
        if let Some(images) = images {
            room.images = images;
        }
        if let Some(amenities) = amenities {
            room.amenities = amenities;
        }

        Room::check_pricing(
            room.kind,
            room.total_beds,
            room.room_price.as_ref(),
            room.bed_price.as_ref(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        match maintenance {
            Some(maintenance) => room.set_maintenance(maintenance),
            None if room.status != room::Status::Maintenance => {
                room.status =
                    room::Status::derive(room.available_beds, room.total_beds);
            }
            None => {}
        }

        tx.execute(Update(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(room)
    }
}

/// Error of [`UpdateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// New bed total is below the current occupancy.
    #[display(
        "cannot resize to {requested} beds: {occupied} are currently occupied"
    )]
    BedsBelowOccupancy {
        /// Requested bed total.
        requested: room::Beds,

        /// Currently occupied beds.
        occupied: room::Beds,
    },

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

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),
}

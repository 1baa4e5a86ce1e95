//! Domain definitions.

pub mod amenity;
pub mod assignment;
pub mod building;
pub mod notification;
pub mod payment;
pub mod preference;
pub mod room;
pub mod room_request;
pub mod student;
pub mod user;

pub use self::{
    amenity::Amenity, assignment::Assignment, building::Building,
    notification::Notification, payment::Payment, preference::Preference,
    room::Room, room_request::RoomRequest, student::Student, user::User,
};

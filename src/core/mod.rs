//! Mission models, password handling and the data access gateway.

pub mod gateway;
pub mod models;
pub mod password;

pub use gateway::Gateway;
pub use models::{
    GeographicalObject, LocationDetail, LocationSummary, MarsStation, MissionStatus,
    NewGeographicalObject, NewLocation, NewMarsStation, NewScientist, NewStatus, NewTransport,
    NewUser, Status, TaskStatus, Transport, User,
};
pub use password::Argon2Params;

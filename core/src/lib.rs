pub mod models;

pub use models::reservation::{PerUserReservationCache, Reservation, ReservationList, UserId};
pub use models::task::{BookingTask, TaskId, TaskStatus};

pub mod reservation;
pub mod task;

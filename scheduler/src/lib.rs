pub mod clock;
pub mod eligibility;
pub mod engine;
pub mod registry;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use eligibility::{Eligibility, check_date_eligibility, window_end};
pub use engine::BookingScheduler;
pub use registry::TaskRegistry;
pub use types::SchedulerConfig;

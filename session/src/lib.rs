pub mod identity;
pub mod manager;
pub mod reservations;
pub mod store;
pub mod types;

pub use identity::{IdentityProvider, StaticIdentity};
pub use manager::SessionManager;
pub use reservations::ReservationListCache;
pub use store::ReservationStore;
pub use types::SessionConfig;

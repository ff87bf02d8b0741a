pub mod event_members;
pub mod events;
pub mod locations;
pub mod reviews;
pub mod sessions;
pub mod users;

pub use event_members::{EventMemberProfileRow, EventMembersRow};
pub use events::{EventsRow, NearbyEventRow};
pub use locations::LocationsRow;
pub use reviews::ReviewsRow;
pub use sessions::SessionsRow;
pub use users::UsersRow;

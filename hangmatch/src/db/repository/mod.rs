mod friendships;
mod matches;
mod profiles;
mod sessions;

pub use friendships::FriendshipRepository;
pub use matches::MatchRepository;
pub use profiles::ProfileRepository;
pub use sessions::SessionRepository;

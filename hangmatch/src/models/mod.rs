mod matching;
mod profile;
mod session;

pub use matching::*;
pub use profile::*;
pub use session::*;

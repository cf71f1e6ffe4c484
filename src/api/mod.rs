pub mod models;
pub mod session;
pub mod subsonic;

pub use models::*;
pub use session::{AuthScheme, Session, SessionCache};
pub use subsonic::{Envelope, SubsonicClient};

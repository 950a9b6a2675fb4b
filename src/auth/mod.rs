//! Authentication: user records, the signed-in session, and the service
//! that ties them to storage.

pub mod record;
pub mod service;
pub mod session;

pub use record::{AuthRecord, AuthRecords};
pub use service::{AuthService, MAX_LOGIN_ATTEMPTS};
pub use session::Session;

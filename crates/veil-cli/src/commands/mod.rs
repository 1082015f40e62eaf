pub mod common;
pub mod passcode;
pub mod password;
pub mod privacy;
pub mod status;
pub mod watch;

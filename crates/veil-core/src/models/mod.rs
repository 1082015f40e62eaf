//! Data models for Veil

mod passcode;
mod password;
mod privacy;

pub use passcode::{LocalPasscodeState, DEFAULT_AUTO_LOCK_SECONDS};
pub use password::{AlgoDescriptor, PasswordRequest, PasswordState, PasswordStatus, StateIdentity};
pub use privacy::{PeerId, PrivacyKey, PrivacyOption, PrivacyRule};

mod identity;
mod live_state;
mod profile;

pub use identity::MachineIdentity;
pub use live_state::{LiveState, StatusReport, UNKNOWN_EMAIL};
pub use profile::{
    format_last_active, ProfileName, ProfileNameError, ProfileSummary, LAST_ACTIVE_FORMAT,
};

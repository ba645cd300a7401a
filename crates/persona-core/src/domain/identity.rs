use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use uuid::Uuid;

/// The three identifier fields that make an installation recognisable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIdentity {
    pub machine_id: String,
    pub mac_machine_id: String,
    pub dev_device_id: String,
}

impl MachineIdentity {
    /// Draws fresh identifiers from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let mut seed_256 = [0u8; 32];
        OsRng.fill_bytes(&mut seed_256);

        let mut seed_512 = [0u8; 64];
        OsRng.fill_bytes(&mut seed_512);

        Self {
            machine_id: hex::encode(Sha256::digest(seed_256)),
            mac_machine_id: hex::encode(Sha512::digest(seed_512)),
            dev_device_id: Uuid::new_v4().hyphenated().to_string(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        is_lower_hex(&self.machine_id, 64)
            && is_lower_hex(&self.mac_machine_id, 128)
            && Uuid::parse_str(&self.dev_device_id).is_ok()
            && self.dev_device_id.len() == 36
    }
}

fn is_lower_hex(value: &str, length: usize) -> bool {
    value.len() == length
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

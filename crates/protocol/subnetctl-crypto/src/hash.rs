//! VM id derivation.
//!
//! ```text
//! vm_id_for(name) = H(0x02 || name)
//! ```

use sha2::{Digest, Sha256};

use crate::Hash;

const DOMAIN_VM_ID: u8 = 0x02;

/// Derive the VM id the node runtime uses to find a plugin binary.
///
/// The id only depends on the VM name, so two subnets sharing a VM name share
/// a plugin slot.
pub fn vm_id_for(vm_name: &str) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([DOMAIN_VM_ID]);
    hasher.update(vm_name.as_bytes());
    Hash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_id_depends_on_name_only() {
        assert_eq!(vm_id_for("mysubnet"), vm_id_for("mysubnet"));
        assert_ne!(vm_id_for("mysubnet"), vm_id_for("othersubnet"));
    }

    #[test]
    fn test_vm_id_is_domain_separated() {
        let plain: [u8; 32] = Sha256::digest(b"subnetevm").into();
        assert_ne!(vm_id_for("subnetevm").0, plain);
        assert!(!vm_id_for("subnetevm").to_base58().is_empty());
    }
}

//! Audit chain verification

use crate::error::{ObserverError, Result};
use registry_core::audit::{chain_hash, AuditEntry};

/// Recompute the hash chain over a replayed slice of audit entries
///
/// Checks sequence density, the previous-hash links, and every entry hash.
/// Returns the first divergence.
pub fn verify_entries(entries: &[AuditEntry]) -> Result<()> {
    let mut prev_hash = [0u8; 32];
    for (i, entry) in entries.iter().enumerate() {
        if entry.sequence != i as u64 {
            return Err(ObserverError::ChainBroken {
                sequence: entry.sequence,
                reason: format!("expected sequence {}", i),
            });
        }
        if entry.prev_hash != prev_hash {
            return Err(ObserverError::ChainBroken {
                sequence: entry.sequence,
                reason: "previous-hash link does not match".to_string(),
            });
        }
        let recomputed = chain_hash(entry.sequence, &entry.prev_hash, &entry.event);
        if entry.entry_hash != recomputed {
            return Err(ObserverError::ChainBroken {
                sequence: entry.sequence,
                reason: "entry hash does not match its contents".to_string(),
            });
        }
        prev_hash = entry.entry_hash;
    }
    Ok(())
}

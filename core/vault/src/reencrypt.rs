//! All-or-nothing re-encryption for master password changes.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cipher;
use crate::identity::AccountIdentity;
use crate::policy;
use crate::VaultItemPayload;
use vaultpass_common::{AccountId, Error, Result};
use vaultpass_crypto::{derive_key, KdfParams};
use vaultpass_storage::{VaultRecord, VaultStore};

/// Marks a payload as the account's own self-referential credential entry.
///
/// A product convention, not a crypto rule: kept injectable so the transform
/// below stays generic.
pub type SelfEntryPredicate = Arc<dyn Fn(&VaultItemPayload) -> bool + Send + Sync>;

/// Recomputes every record's ciphertext under a new master password.
///
/// Side-effect free: output ciphertexts are built fully in memory and the
/// caller persists them only after complete success, so partial failure never
/// touches durable storage.
pub struct ReencryptionCoordinator {
    params: KdfParams,
    self_entry: Option<SelfEntryPredicate>,
}

impl ReencryptionCoordinator {
    /// Create a coordinator using the given derivation parameters.
    pub fn new(params: KdfParams) -> Self {
        Self {
            params,
            self_entry: None,
        }
    }

    /// Install the self-referential entry convention.
    ///
    /// A matching payload gets its embedded password field rewritten to the
    /// new master password during re-encryption.
    pub fn with_self_entry(mut self, predicate: SelfEntryPredicate) -> Self {
        self.self_entry = Some(predicate);
        self
    }

    /// Decrypt every record under the old password's key and re-encrypt under
    /// the new one.
    ///
    /// Every record is processed and every failure collected before deciding:
    /// a single failure fails the whole operation and no output is returned.
    ///
    /// # Errors
    /// - [`Error::ReencryptionFailed`] naming each record that could not be
    ///   decrypted or re-encrypted
    pub fn reencrypt(
        &self,
        records: &[VaultRecord],
        old_password: &str,
        new_password: &str,
        account: &AccountId,
    ) -> Result<Vec<VaultRecord>> {
        let old_key = derive_key(old_password, account, &self.params)?;
        let new_key = derive_key(new_password, account, &self.params)?;

        let mut reencrypted = Vec::with_capacity(records.len());
        let mut reasons = Vec::new();

        for record in records {
            match cipher::decrypt_item(&record.ciphertext, &old_key) {
                Ok(mut payload) => {
                    if self.matches_self_entry(&payload) {
                        payload.password = new_password.to_string();
                    }
                    match cipher::encrypt_item(&payload, &new_key) {
                        Ok(ciphertext) => reencrypted.push(record.with_ciphertext(ciphertext)),
                        Err(e) => reasons.push(format!("{}: {}", record.id, e)),
                    }
                }
                Err(e) => reasons.push(format!("{}: {}", record.id, e)),
            }
        }

        if !reasons.is_empty() {
            warn!(
                failed = reasons.len(),
                total = records.len(),
                "Re-encryption aborted; nothing will be persisted"
            );
            return Err(Error::ReencryptionFailed {
                failed: reasons.len(),
                reasons,
            });
        }

        Ok(reencrypted)
    }

    fn matches_self_entry(&self, payload: &VaultItemPayload) -> bool {
        self.self_entry
            .as_ref()
            .map(|predicate| predicate(payload))
            .unwrap_or(false)
    }
}

/// Change the master password: verify the current credential, re-encrypt
/// every record, and persist the swap only after complete success.
///
/// Records are written before the credential, so an interrupted swap leaves
/// ciphertexts that the new credential will match once retried. Nothing is
/// written at all unless every record re-encrypted cleanly.
///
/// Returns the number of re-encrypted records.
///
/// # Errors
/// - [`Error::InvalidInput`] when the new password violates the length policy
/// - [`Error::InvalidPassword`] when the current credential does not match
/// - [`Error::ReencryptionFailed`] when any record fails; nothing is persisted
pub async fn change_master_password(
    identity: &dyn AccountIdentity,
    store: &dyn VaultStore,
    coordinator: &ReencryptionCoordinator,
    current_password: &str,
    new_password: &str,
) -> Result<usize> {
    policy::validate_master_password(new_password)?;

    if !identity.verify_credential(current_password).await? {
        return Err(Error::InvalidPassword);
    }

    let account = identity.account_id();
    let records = store.list(account).await?;
    let reencrypted =
        coordinator.reencrypt(&records, current_password, new_password, account)?;

    let count = reencrypted.len();
    for record in reencrypted {
        store.put(record).await?;
    }
    identity.update_credential(new_password).await?;

    info!(count, "Master password changed");
    Ok(count)
}

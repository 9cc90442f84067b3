//! Profile precedence, migration, and edits.
//!
//! The profile sub-record (`users/{id}/profile/main`) is canonical. The
//! base user record and the type-specific record carry denormalized copies
//! so list screens avoid a second read. Precedence when displaying:
//! sub-record > type-specific record > base record.

use serde_json::json;
use std::sync::Arc;

use assist_core::collections::{self, APPLICANTS, SUBSCRIBERS, USERS};
use assist_core::{ProfileFields, UserRecord, UserType};
use assist_store::{DocumentStore, WriteBatch};

use crate::error::AccountError;

/// Resolve one profile from the three duplicated locations.
pub fn merged_profile(
    base: &ProfileFields,
    type_specific: &ProfileFields,
    sub_record: &ProfileFields,
) -> ProfileFields {
    sub_record.or_else_from(type_specific).or_else_from(base)
}

/// What the migration routine did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The sub-record already had address data; zero writes performed.
    NotNeeded,
    /// Data was copied into the sub-record.
    Migrated,
}

/// Reads and converges the duplicated profile locations.
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Best-effort convergence: copy the highest-precedence data into the
    /// profile sub-record when the sub-record lacks address data.
    ///
    /// Idempotent: re-running on a migrated profile reports `NotNeeded`
    /// and performs zero writes.
    pub async fn migrate_profile(&self, user_id: &str) -> Result<MigrationOutcome, AccountError> {
        let (user, type_profile, sub_profile) = self.load_copies(user_id).await?;

        if sub_profile.has_address_data() {
            return Ok(MigrationOutcome::NotNeeded);
        }

        let merged = merged_profile(&user.profile, &type_profile, &sub_profile);
        if !merged.has_address_data() {
            // Nothing anywhere worth copying.
            return Ok(MigrationOutcome::NotNeeded);
        }

        self.store
            .set(
                &collections::profile_collection(user_id),
                collections::PROFILE_DOC,
                serde_json::to_value(&merged)?,
            )
            .await?;
        tracing::info!(user_id, "profile migrated into sub-record");
        Ok(MigrationOutcome::Migrated)
    }

    /// Apply a profile edit: the sub-record is written first in the batch,
    /// and both denormalized caches are refreshed alongside it.
    pub async fn update_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> Result<(), AccountError> {
        let (user, _, sub_profile) = self.load_copies(user_id).await?;
        let next = fields.or_else_from(&sub_profile);
        let next_value = serde_json::to_value(&next)?;

        let mut batch = WriteBatch::new()
            .set(
                collections::profile_collection(user_id),
                collections::PROFILE_DOC,
                next_value.clone(),
            )
            .update(USERS, user_id, json!({"profile": next_value.clone()}));

        let type_collection = type_collection_for(user.user_type);
        if let Some(type_collection) = type_collection {
            if self.store.get(type_collection, user_id).await?.is_some() {
                batch = batch.update(type_collection, user_id, json!({"profile": next_value}));
            }
        }

        self.store.commit(batch).await?;
        Ok(())
    }

    /// The merged profile a dashboard screen should display.
    pub async fn display_profile(&self, user_id: &str) -> Result<ProfileFields, AccountError> {
        let (user, type_profile, sub_profile) = self.load_copies(user_id).await?;
        Ok(merged_profile(&user.profile, &type_profile, &sub_profile))
    }

    async fn load_copies(
        &self,
        user_id: &str,
    ) -> Result<(UserRecord, ProfileFields, ProfileFields), AccountError> {
        let doc = self
            .store
            .get(USERS, user_id)
            .await?
            .ok_or_else(|| AccountError::NotFound(format!("users/{}", user_id)))?;
        let user: UserRecord = serde_json::from_value(doc)?;

        let type_profile = match type_collection_for(user.user_type) {
            Some(collection) => self
                .store
                .get(collection, user_id)
                .await?
                .and_then(|doc| doc.get("profile").cloned())
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or_default(),
            None => ProfileFields::default(),
        };

        let sub_profile = self
            .store
            .get(&collections::profile_collection(user_id), collections::PROFILE_DOC)
            .await?
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();

        Ok((user, type_profile, sub_profile))
    }
}

fn type_collection_for(user_type: UserType) -> Option<&'static str> {
    match user_type {
        UserType::Subscriber => Some(SUBSCRIBERS),
        UserType::Applicant => Some(APPLICANTS),
        UserType::Admin => None,
    }
}

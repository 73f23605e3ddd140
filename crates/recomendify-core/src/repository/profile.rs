//! Profile directory trait definition.

use recomendify_types::error::StoreError;
use recomendify_types::peer::Profile;

/// Read/write access to the `profiles` table.
pub trait ProfileDirectory: Send + Sync {
    /// Every registered profile, ordered by display name.
    fn list_profiles(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Profile>, StoreError>> + Send;

    fn get_profile(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, StoreError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, StoreError>> + Send;

    /// Insert or replace a profile keyed by id.
    fn upsert_profile(
        &self,
        profile: &Profile,
    ) -> impl std::future::Future<Output = Result<Profile, StoreError>> + Send;
}

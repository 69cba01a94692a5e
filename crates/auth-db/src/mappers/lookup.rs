//! Lookup entry <-> model mapper

use auth_core::entities::LookupEntry;

use crate::models::LookupModel;

impl From<LookupModel> for LookupEntry {
    fn from(model: LookupModel) -> Self {
        LookupEntry {
            email: model.email,
            username: model.username,
            user_id: model.user_id,
            tenant_id: model.tenant_id,
            tenant_slug: model.tenant_slug,
            tenant_schema: model.tenant_schema,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

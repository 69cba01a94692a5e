//! Session <-> model mapper

use auth_core::entities::Session;
use auth_core::value_objects::RefreshTokenHash;

use crate::models::SessionModel;

impl From<SessionModel> for Session {
    fn from(model: SessionModel) -> Self {
        Session {
            id: model.id,
            user_id: model.user_id,
            refresh_token_hash: RefreshTokenHash::from_stored(model.refresh_token_hash),
            user_agent: model.user_agent,
            ip_address: model.ip_address,
            expires_at: model.expires_at,
            created_at: model.created_at,
            last_used_at: model.last_used_at,
            revoked_at: model.revoked_at,
        }
    }
}

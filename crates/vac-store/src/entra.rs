use rusqlite::{Row, params};

use vac_model::EntraSettings;

use crate::error::StoreResult;
use crate::store::Store;

fn settings_from_row(row: &Row<'_>) -> rusqlite::Result<EntraSettings> {
    Ok(EntraSettings {
        tenant_id: row.get(0)?,
        client_id: row.get(1)?,
        client_secret: row.get(2)?,
        enabled: row.get(3)?,
        registration_token: row.get(4)?,
    })
}

impl Store {
    /// Read the SSO settings singleton. Migrations guarantee the row exists.
    pub fn entra_settings(&self) -> StoreResult<EntraSettings> {
        let conn = self.conn();
        let settings = conn.query_row(
            "SELECT tenant_id, client_id, client_secret, enabled, registration_token
             FROM entra_config WHERE id = 1",
            [],
            settings_from_row,
        )?;
        Ok(settings)
    }

    /// Persist SSO settings. A `None` client secret keeps whatever is
    /// currently stored, so the admin form can leave the field blank.
    pub fn update_entra_settings(&self, settings: &EntraSettings) -> StoreResult<()> {
        let conn = self.conn();
        match &settings.client_secret {
            Some(secret) => {
                conn.execute(
                    "UPDATE entra_config
                     SET tenant_id = ?1, client_id = ?2, client_secret = ?3,
                         registration_token = ?4, enabled = ?5,
                         updated_at = CURRENT_TIMESTAMP
                     WHERE id = 1",
                    params![
                        settings.tenant_id,
                        settings.client_id,
                        secret,
                        settings.registration_token,
                        settings.enabled,
                    ],
                )?;
            }
            None => {
                conn.execute(
                    "UPDATE entra_config
                     SET tenant_id = ?1, client_id = ?2,
                         registration_token = ?3, enabled = ?4,
                         updated_at = CURRENT_TIMESTAMP
                     WHERE id = 1",
                    params![
                        settings.tenant_id,
                        settings.client_id,
                        settings.registration_token,
                        settings.enabled,
                    ],
                )?;
            }
        }
        Ok(())
    }
}

//! PostgREST access to the `materials` table.

use super::SupabaseClient;
use super::types::{Fetched, MaterialRow, MaterialStore, NewMaterial, SupabaseError};

const MATERIALS_PATH: &str = "/rest/v1/materials";
/// Row columns plus the creator's email from `profiles`.
pub(crate) const MATERIAL_SELECT: &str = "*,profile:profiles(email)";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST filter value selecting one row by primary key.
pub(crate) fn id_filter(id: i64) -> String {
    format!("eq.{id}")
}

#[async_trait::async_trait]
impl MaterialStore for SupabaseClient {
    async fn list_materials(&self, access_token: &str) -> Result<Fetched<Vec<MaterialRow>>, SupabaseError> {
        let request = self
            .http
            .get(self.endpoint(MATERIALS_PATH))
            .query(&[("select", MATERIAL_SELECT), ("order", "created_at.desc")]);
        self.send_json(self.authorized(request, access_token))
            .await
    }

    async fn insert_material(&self, access_token: &str, material: &NewMaterial) -> Result<MaterialRow, SupabaseError> {
        let request = self
            .http
            .post(self.endpoint(MATERIALS_PATH))
            .query(&[("select", MATERIAL_SELECT)])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&[material]);
        Ok(self
            .send_json::<MaterialRow>(self.authorized(request, access_token))
            .await?
            .data)
    }

    async fn delete_material(&self, access_token: &str, id: i64) -> Result<(), SupabaseError> {
        let request = self
            .http
            .delete(self.endpoint(MATERIALS_PATH))
            .query(&[("id", id_filter(id))]);
        self.send(self.authorized(request, access_token))
            .await?;
        Ok(())
    }
}

//! Client repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use vigil_core::{
    Client, ClientRepository, CreateClientRequest, Error, Result, UpdateClientRequest,
};

pub(crate) const CLIENT_COLUMNS: &str = "id, display_name, neighborhood, notes, created_at, follow_up_at, \
     need_housing, need_food, need_therapy, need_job, need_transport, home_lat, home_lon";

/// PostgreSQL implementation of ClientRepository.
pub struct PgClientRepository {
    pool: Pool<Postgres>,
}

impl PgClientRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn client_from_row(r: &PgRow) -> Client {
    Client {
        id: r.get("id"),
        display_name: r.get("display_name"),
        neighborhood: r.get("neighborhood"),
        notes: r.get("notes"),
        created_at: r.get("created_at"),
        follow_up_at: r.get("follow_up_at"),
        need_housing: r.get("need_housing"),
        need_food: r.get("need_food"),
        need_therapy: r.get("need_therapy"),
        need_job: r.get("need_job"),
        need_transport: r.get("need_transport"),
        home_lat: r.get("home_lat"),
        home_lon: r.get("home_lon"),
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn create(&self, req: CreateClientRequest) -> Result<Client> {
        let req = req.validate()?;
        let client = Client {
            id: Uuid::now_v7(),
            display_name: req.display_name,
            neighborhood: req.neighborhood,
            notes: req.notes,
            created_at: Utc::now(),
            follow_up_at: req.follow_up_at,
            need_housing: req.need_housing,
            need_food: req.need_food,
            need_therapy: req.need_therapy,
            need_job: req.need_job,
            need_transport: req.need_transport,
            home_lat: req.home_lat,
            home_lon: req.home_lon,
        };

        sqlx::query(&format!(
            "INSERT INTO client ({CLIENT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(client.id)
        .bind(&client.display_name)
        .bind(&client.neighborhood)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.follow_up_at)
        .bind(client.need_housing)
        .bind(client.need_food)
        .bind(client.need_therapy)
        .bind(client.need_job)
        .bind(client.need_transport)
        .bind(client.home_lat)
        .bind(client.home_lon)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "clients",
            op = "create",
            client_id = %client.id,
            "Client created"
        );
        Ok(client)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Client>> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM client WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(client_from_row))
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(client_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<Client> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::ClientNotFound(id))?;

        let mut client = client_from_row(&row);
        req.apply(&mut client)?;

        sqlx::query(
            "UPDATE client SET
                display_name = $2, neighborhood = $3, notes = $4, follow_up_at = $5,
                need_housing = $6, need_food = $7, need_therapy = $8, need_job = $9,
                need_transport = $10, home_lat = $11, home_lon = $12
             WHERE id = $1",
        )
        .bind(client.id)
        .bind(&client.display_name)
        .bind(&client.neighborhood)
        .bind(&client.notes)
        .bind(client.follow_up_at)
        .bind(client.need_housing)
        .bind(client.need_food)
        .bind(client.need_therapy)
        .bind(client.need_job)
        .bind(client.need_transport)
        .bind(client.home_lat)
        .bind(client.home_lon)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "clients",
            op = "update",
            client_id = %id,
            "Client updated"
        );
        Ok(client)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // contact_log rows go with the client via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM client WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ClientNotFound(id));
        }

        info!(
            subsystem = "database",
            component = "clients",
            op = "delete",
            client_id = %id,
            "Client deleted"
        );
        Ok(())
    }
}

use crate::models::AllianceRow;
use crate::models::AllianceSummary;
use anyhow::Result;
use sqlx::Pool;
use sqlx::Postgres;
use sqlx::Row;
use sqlx::Transaction;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing::instrument;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Db {
  pool: Pool<Postgres>,
}

impl Db {
  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    MIGRATOR.run(&pool).await?;
    let version = sqlx::query_scalar::<_, String>("SELECT version()")
      .fetch_one(&pool)
      .await?;
    info!(version = %version, "connected to postgres");
    Ok(Self { pool })
  }

  /// Registers the player on first contact and returns their row id.
  #[instrument(skip(self))]
  pub async fn ensure_player(&self, tg_id: i64) -> Result<i64> {
    let mut tx = self.pool.begin().await?;
    let player_id = ensure_player_in_tx(&mut tx, tg_id).await?;
    tx.commit().await?;
    Ok(player_id)
  }

  #[instrument(skip(self))]
  pub async fn create_alliance(&self, name: &str, tg_id: i64) -> Result<i64> {
    let mut tx = self.pool.begin().await?;
    let player_id = ensure_player_in_tx(&mut tx, tg_id).await?;
    let alliance_id =
      sqlx::query_scalar::<_, i64>("INSERT INTO alliances (name, master_id) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(player_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(alliance_id)
  }

  #[instrument(skip(self))]
  pub async fn list_alliances_by_master(&self, tg_id: i64) -> Result<Vec<AllianceSummary>> {
    let rows = sqlx::query(
      r#"
      SELECT a.id, a.name
      FROM alliances a
      INNER JOIN players p ON p.id = a.master_id
      WHERE p.tg_id = $1
      ORDER BY a.name
      "#,
    )
    .bind(tg_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(
      rows
        .into_iter()
        .map(|row| AllianceSummary {
          id: row.get("id"),
          name: row.get("name"),
        })
        .collect(),
    )
  }

  #[instrument(skip(self))]
  pub async fn is_master(&self, alliance_id: i64, tg_id: i64) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
      r#"
      SELECT EXISTS(
        SELECT 1
        FROM alliances a
        INNER JOIN players p ON p.id = a.master_id
        WHERE a.id = $1 AND p.tg_id = $2
      )
      "#,
    )
    .bind(alliance_id)
    .bind(tg_id)
    .fetch_one(&self.pool)
    .await?;
    Ok(exists)
  }

  #[instrument(skip(self))]
  pub async fn get_alliance(&self, alliance_id: i64) -> Result<Option<AllianceRow>> {
    let row = sqlx::query("SELECT id, name, chat_id FROM alliances WHERE id = $1")
      .bind(alliance_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(|row| AllianceRow {
      id: row.get("id"),
      name: row.get("name"),
      chat_id: row.get("chat_id"),
    }))
  }

  #[instrument(skip(self))]
  pub async fn get_alliance_name(&self, alliance_id: i64) -> Result<Option<String>> {
    let name = sqlx::query_scalar::<_, String>("SELECT name FROM alliances WHERE id = $1")
      .bind(alliance_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(name)
  }

  #[instrument(skip(self))]
  pub async fn rename_alliance(&self, alliance_id: i64, new_name: &str) -> Result<()> {
    sqlx::query("UPDATE alliances SET name = $1 WHERE id = $2")
      .bind(new_name)
      .bind(alliance_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  #[instrument(skip(self))]
  pub async fn delete_alliance(&self, alliance_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM alliances WHERE id = $1")
      .bind(alliance_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  /// Binds the alliance to a group chat, or clears the binding when `chat_id` is `None`.
  #[instrument(skip(self))]
  pub async fn bind_chat(&self, alliance_id: i64, chat_id: Option<i64>) -> Result<()> {
    sqlx::query("UPDATE alliances SET chat_id = $1 WHERE id = $2")
      .bind(chat_id)
      .bind(alliance_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

async fn ensure_player_in_tx(tx: &mut Transaction<'_, Postgres>, tg_id: i64) -> Result<i64> {
  sqlx::query("INSERT INTO players (tg_id) VALUES ($1) ON CONFLICT (tg_id) DO NOTHING")
    .bind(tg_id)
    .execute(&mut **tx)
    .await?;
  let player_id = sqlx::query_scalar::<_, i64>("SELECT id FROM players WHERE tg_id = $1")
    .bind(tg_id)
    .fetch_one(&mut **tx)
    .await?;
  Ok(player_id)
}

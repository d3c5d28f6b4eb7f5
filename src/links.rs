use anyhow::Result;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde::Deserialize;
use serde::Serialize;
use tracing::instrument;
use tracing::warn;

/// How long a chat link request stays valid.
pub const LINK_TTL_SECS: u64 = 300;

const LINK_KEY_PREFIX: &str = "chat_link:";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingLink {
  pub user_id: i64,
  pub alliance_id: i64,
}

/// Short-lived link requests, keyed per user so a newer request replaces the older one.
#[derive(Clone)]
pub struct LinkStore {
  conn: MultiplexedConnection,
}

impl LinkStore {
  pub async fn connect(redis_url: &str) -> Result<Self> {
    let client = redis::Client::open(redis_url)?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(Self { conn })
  }

  #[instrument(skip(self))]
  pub async fn put_link_request(&self, user_id: i64, alliance_id: i64) -> Result<()> {
    let record = PendingLink { user_id, alliance_id };
    let payload = serde_json::to_string(&record)?;
    let mut conn = self.conn.clone();
    let _: () = conn.set_ex(link_key(user_id), payload, LINK_TTL_SECS).await?;
    Ok(())
  }

  /// An expired or malformed record reads as no request at all.
  #[instrument(skip(self))]
  pub async fn get_link_request(&self, user_id: i64) -> Result<Option<PendingLink>> {
    let mut conn = self.conn.clone();
    let raw: Option<String> = conn.get(link_key(user_id)).await?;
    Ok(raw.as_deref().and_then(|value| decode_link_request(user_id, value)))
  }

  #[instrument(skip(self))]
  pub async fn clear_link_request(&self, user_id: i64) -> Result<()> {
    let mut conn = self.conn.clone();
    let _: () = conn.del(link_key(user_id)).await?;
    Ok(())
  }

  #[instrument(skip(self))]
  pub async fn has_link_request(&self, user_id: i64) -> Result<bool> {
    let mut conn = self.conn.clone();
    let exists: bool = conn.exists(link_key(user_id)).await?;
    Ok(exists)
  }
}

fn link_key(user_id: i64) -> String {
  format!("{LINK_KEY_PREFIX}{user_id}")
}

fn decode_link_request(user_id: i64, raw: &str) -> Option<PendingLink> {
  match serde_json::from_str(raw) {
    Ok(record) => Some(record),
    Err(err) => {
      warn!(user_id, error = %err, "malformed link request record, leaving it to expire");
      None
    },
  }
}

#[cfg(test)]
mod tests {
  use super::PendingLink;
  use super::decode_link_request;
  use super::link_key;

  #[test]
  fn keys_are_prefixed_per_user() {
    assert_eq!(link_key(42), "chat_link:42");
  }

  #[test]
  fn decodes_well_formed_records() {
    let record = decode_link_request(1, r#"{"user_id":1,"alliance_id":7}"#);
    assert_eq!(
      record,
      Some(PendingLink {
        user_id: 1,
        alliance_id: 7,
      })
    );
  }

  #[test]
  fn malformed_records_read_as_absent() {
    assert_eq!(decode_link_request(1, "not json"), None);
    assert_eq!(decode_link_request(1, r#"{"user_id":1}"#), None);
  }
}

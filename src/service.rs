use anyhow::Result;
use tracing::info;
use tracing::warn;

use crate::db::Db;
use crate::links::LinkStore;
use crate::models::AllianceRow;
use crate::models::AllianceSummary;

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
  #[error("empty alliance name")]
  EmptyName,
  #[error("storage error: {0}")]
  Storage(#[from] anyhow::Error),
}

impl CreateError {
  pub fn user_message(&self) -> String {
    match self {
      CreateError::EmptyName => "You did not provide an alliance name.".to_string(),
      CreateError::Storage(_) => "Something went wrong, please try again later.".to_string(),
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum RenameError {
  #[error("empty alliance name")]
  EmptyName { alliance_id: i64 },
  #[error("user is not the master of alliance {alliance_id}")]
  NotMaster { alliance_id: i64 },
  #[error("alliance {alliance_id} no longer exists")]
  Vanished { alliance_id: i64 },
  #[error("storage error: {0}")]
  Storage(#[from] anyhow::Error),
}

impl RenameError {
  pub fn user_message(&self) -> String {
    match self {
      RenameError::EmptyName { alliance_id } => {
        format!("You did not provide a new name for alliance {alliance_id}.")
      },
      RenameError::NotMaster { .. } => "You are not the master of this alliance.".to_string(),
      RenameError::Vanished { .. } => "Alliance not found.".to_string(),
      RenameError::Storage(_) => "Something went wrong, please try again later.".to_string(),
    }
  }
}

#[derive(Debug)]
pub enum DeleteOutcome {
  Deleted { remaining: Vec<AllianceSummary> },
  NameMismatch { alliance: AllianceRow },
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
  #[error("user is not the master of alliance {alliance_id}")]
  NotMaster { alliance_id: i64 },
  #[error("alliance {alliance_id} no longer exists")]
  Vanished { alliance_id: i64 },
  #[error("storage error: {0}")]
  Storage(#[from] anyhow::Error),
}

impl DeleteError {
  pub fn user_message(&self) -> String {
    match self {
      DeleteError::NotMaster { .. } => "You are not the master of this alliance.".to_string(),
      DeleteError::Vanished { .. } => "Alliance not found.".to_string(),
      DeleteError::Storage(_) => "Something went wrong, please try again later.".to_string(),
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
  #[error("no pending link request")]
  NoPending,
  #[error("user is not the master of alliance {alliance_id}")]
  NotMaster { alliance_id: i64 },
  #[error("alliance {alliance_id} already has a bound chat")]
  AlreadyLinked { alliance_id: i64 },
  #[error("alliance {alliance_id} no longer exists")]
  Vanished { alliance_id: i64 },
  #[error("storage error: {0}")]
  Storage(#[from] anyhow::Error),
}

impl LinkError {
  pub fn user_message(&self) -> String {
    match self {
      LinkError::NoPending => "No pending link request. Start from the alliance menu.".to_string(),
      LinkError::NotMaster { .. } => "You are not the master of this alliance.".to_string(),
      LinkError::AlreadyLinked { .. } => "The alliance already has a linked chat.".to_string(),
      LinkError::Vanished { .. } => "Alliance not found.".to_string(),
      LinkError::Storage(_) => "Something went wrong, please try again later.".to_string(),
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum UnlinkError {
  #[error("user is not the master of alliance {alliance_id}")]
  NotMaster { alliance_id: i64 },
  #[error("alliance {alliance_id} has no bound chat")]
  NotLinked { alliance_id: i64 },
  #[error("alliance {alliance_id} no longer exists")]
  Vanished { alliance_id: i64 },
  #[error("storage error: {0}")]
  Storage(#[from] anyhow::Error),
}

impl UnlinkError {
  pub fn user_message(&self) -> String {
    match self {
      UnlinkError::NotMaster { .. } => "You are not the master of this alliance.".to_string(),
      UnlinkError::NotLinked { .. } => "The alliance has no linked chat.".to_string(),
      UnlinkError::Vanished { .. } => "Alliance not found.".to_string(),
      UnlinkError::Storage(_) => "Something went wrong, please try again later.".to_string(),
    }
  }
}

pub async fn register_player(db: &Db, tg_id: i64) -> Result<i64> {
  let player_id = db.ensure_player(tg_id).await?;
  info!(tg_id, player_id, "ensured player record");
  Ok(player_id)
}

pub async fn create_alliance(db: &Db, tg_id: i64, name: Option<&str>) -> Result<String, CreateError> {
  let Some(name) = normalized_name(name) else {
    return Err(CreateError::EmptyName);
  };
  let alliance_id = db.create_alliance(name, tg_id).await?;
  info!(tg_id, alliance_id, "created alliance");
  Ok(name.to_string())
}

pub async fn list_alliances(db: &Db, tg_id: i64) -> Result<Vec<AllianceSummary>> {
  db.list_alliances_by_master(tg_id).await
}

pub async fn action_menu(db: &Db, alliance_id: i64) -> Result<Option<AllianceRow>> {
  db.get_alliance(alliance_id).await
}

pub async fn rename_alliance(
  db: &Db,
  tg_id: i64,
  alliance_id: i64,
  new_name: Option<&str>,
) -> Result<AllianceRow, RenameError> {
  let Some(new_name) = normalized_name(new_name) else {
    return Err(RenameError::EmptyName { alliance_id });
  };
  let Some(alliance) = db.get_alliance(alliance_id).await? else {
    return Err(RenameError::Vanished { alliance_id });
  };
  if !db.is_master(alliance_id, tg_id).await? {
    warn!(tg_id, alliance_id, "rename attempted by non-master");
    return Err(RenameError::NotMaster { alliance_id });
  }
  db.rename_alliance(alliance_id, new_name).await?;
  info!(tg_id, alliance_id, "renamed alliance");
  Ok(AllianceRow {
    name: new_name.to_string(),
    ..alliance
  })
}

/// Deletion only goes through when the entered name matches the stored one exactly.
pub async fn delete_alliance(
  db: &Db,
  tg_id: i64,
  alliance_id: i64,
  entered_name: &str,
) -> Result<DeleteOutcome, DeleteError> {
  let Some(current_name) = db.get_alliance_name(alliance_id).await? else {
    return Err(DeleteError::Vanished { alliance_id });
  };
  if !db.is_master(alliance_id, tg_id).await? {
    warn!(tg_id, alliance_id, "delete attempted by non-master");
    return Err(DeleteError::NotMaster { alliance_id });
  }
  if !delete_name_matches(entered_name, &current_name) {
    info!(tg_id, alliance_id, "delete confirmation name mismatch");
    let Some(alliance) = db.get_alliance(alliance_id).await? else {
      return Err(DeleteError::Vanished { alliance_id });
    };
    return Ok(DeleteOutcome::NameMismatch { alliance });
  }
  if !db.delete_alliance(alliance_id).await? {
    warn!(tg_id, alliance_id, "alliance was already gone at delete time");
  }
  info!(tg_id, alliance_id, "deleted alliance");
  let remaining = db.list_alliances_by_master(tg_id).await?;
  Ok(DeleteOutcome::Deleted { remaining })
}

pub async fn begin_chat_link(db: &Db, links: &LinkStore, tg_id: i64, alliance_id: i64) -> Result<(), LinkError> {
  if db.get_alliance(alliance_id).await?.is_none() {
    return Err(LinkError::Vanished { alliance_id });
  }
  if !db.is_master(alliance_id, tg_id).await? {
    warn!(tg_id, alliance_id, "chat link requested by non-master");
    return Err(LinkError::NotMaster { alliance_id });
  }
  links.put_link_request(tg_id, alliance_id).await?;
  info!(tg_id, alliance_id, "stored pending chat link request");
  Ok(())
}

/// Consumes the pending request and binds the current chat, re-checking
/// mastership and the single-chat rule in case anything changed since the
/// request was made.
pub async fn confirm_chat_link(db: &Db, links: &LinkStore, tg_id: i64, chat_id: i64) -> Result<i64, LinkError> {
  let Some(pending) = links.get_link_request(tg_id).await? else {
    return Err(LinkError::NoPending);
  };
  let alliance_id = pending.alliance_id;
  let Some(alliance) = db.get_alliance(alliance_id).await? else {
    warn!(tg_id, alliance_id, "pending link points at a missing alliance");
    return Err(LinkError::Vanished { alliance_id });
  };
  if !db.is_master(alliance_id, tg_id).await? {
    warn!(tg_id, alliance_id, "chat link confirmation by non-master");
    return Err(LinkError::NotMaster { alliance_id });
  }
  if alliance.chat_id.is_some() {
    return Err(LinkError::AlreadyLinked { alliance_id });
  }
  db.bind_chat(alliance_id, Some(chat_id)).await?;
  links.clear_link_request(tg_id).await?;
  info!(tg_id, alliance_id, chat_id, "bound chat to alliance");
  Ok(alliance_id)
}

pub async fn unbind_chat(db: &Db, tg_id: i64, alliance_id: i64) -> Result<AllianceRow, UnlinkError> {
  let Some(alliance) = db.get_alliance(alliance_id).await? else {
    return Err(UnlinkError::Vanished { alliance_id });
  };
  if !db.is_master(alliance_id, tg_id).await? {
    warn!(tg_id, alliance_id, "chat unlink attempted by non-master");
    return Err(UnlinkError::NotMaster { alliance_id });
  }
  if alliance.chat_id.is_none() {
    return Err(UnlinkError::NotLinked { alliance_id });
  }
  db.bind_chat(alliance_id, None).await?;
  info!(tg_id, alliance_id, "unbound chat from alliance");
  Ok(AllianceRow {
    chat_id: None,
    ..alliance
  })
}

fn normalized_name(input: Option<&str>) -> Option<&str> {
  input.map(str::trim).filter(|name| !name.is_empty())
}

fn delete_name_matches(entered: &str, current: &str) -> bool {
  entered.trim() == current
}

#[cfg(test)]
mod tests {
  use super::delete_name_matches;
  use super::normalized_name;

  #[test]
  fn trims_and_rejects_blank_names() {
    assert_eq!(normalized_name(Some("  Phoenix  ")), Some("Phoenix"));
    assert_eq!(normalized_name(Some("   ")), None);
    assert_eq!(normalized_name(None), None);
  }

  #[test]
  fn deletion_requires_the_exact_stored_name() {
    assert!(delete_name_matches("Phoenix", "Phoenix"));
    assert!(delete_name_matches("  Phoenix ", "Phoenix"));
    assert!(!delete_name_matches("phoenix", "Phoenix"));
    assert!(!delete_name_matches("Phoeni", "Phoenix"));
  }
}

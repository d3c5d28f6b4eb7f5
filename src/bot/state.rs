use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "data")]
pub enum ConversationState {
  #[default]
  Idle,
  AwaitingName(CreateDraft),
  SelectingAlliance { owner_tg_id: i64 },
  AllianceMenu(ManageTarget),
  EnteringRename(RenameDraft),
  ConfirmingRename(RenameDraft),
  ConfirmingDelete(DeleteTarget),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateDraft {
  pub owner_tg_id: i64,
  pub name: Option<String>,
}

impl CreateDraft {
  pub fn new(owner_tg_id: i64) -> Self {
    Self {
      owner_tg_id,
      name: None,
    }
  }
}

/// Which alliance the action menu is open for, and who opened it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManageTarget {
  pub owner_tg_id: i64,
  pub alliance_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameDraft {
  pub owner_tg_id: i64,
  pub alliance_id: i64,
  pub new_name: Option<String>,
}

impl RenameDraft {
  pub fn new(owner_tg_id: i64, alliance_id: i64) -> Self {
    Self {
      owner_tg_id,
      alliance_id,
      new_name: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteTarget {
  pub owner_tg_id: i64,
  pub alliance_id: i64,
}

#[cfg(test)]
mod tests {
  use super::ConversationState;
  use super::CreateDraft;
  use super::RenameDraft;

  #[test]
  fn default_state_is_idle() {
    assert_eq!(ConversationState::default(), ConversationState::Idle);
  }

  #[test]
  fn new_drafts_start_without_a_name() {
    let create = CreateDraft::new(10);
    assert_eq!(create.owner_tg_id, 10);
    assert!(create.name.is_none());

    let rename = RenameDraft::new(10, 3);
    assert_eq!(rename.alliance_id, 3);
    assert!(rename.new_name.is_none());
  }
}

use teloxide::types::InlineKeyboardButton;
use teloxide::types::InlineKeyboardMarkup;

use crate::models::AllianceRow;
use crate::models::AllianceSummary;

pub const PAGE_SIZE: usize = 5;

const MAX_BUTTON_TEXT: usize = 48;

/// Text plus keyboard for one rendered menu message.
pub struct MenuView {
  pub text: String,
  pub keyboard: InlineKeyboardMarkup,
}

pub fn alliance_list_view(alliances: &[AllianceSummary], page: usize, banner: Option<&str>) -> MenuView {
  let prompt = "👥 Select an alliance to manage:";
  let text = match banner {
    Some(banner) => format!("{banner}\n\n{prompt}"),
    None => prompt.to_string(),
  };
  MenuView {
    text,
    keyboard: alliance_list_keyboard(alliances, page),
  }
}

/// One button per alliance, five per page, with nav controls only where a
/// neighboring page exists. Out of range pages clamp to the nearest valid one.
pub fn alliance_list_keyboard(alliances: &[AllianceSummary], page: usize) -> InlineKeyboardMarkup {
  let total_pages = alliances.len().div_ceil(PAGE_SIZE).max(1);
  let page = page.clamp(1, total_pages);
  let start = (page - 1) * PAGE_SIZE;
  let end = (start + PAGE_SIZE).min(alliances.len());

  let mut rows: Vec<Vec<InlineKeyboardButton>> = alliances[start..end]
    .iter()
    .map(|alliance| {
      vec![InlineKeyboardButton::callback(
        truncate_button_text(&alliance.name, MAX_BUTTON_TEXT),
        format!("settings_alliance_{}", alliance.id),
      )]
    })
    .collect();

  let mut nav = Vec::new();
  if page > 1 {
    nav.push(InlineKeyboardButton::callback("◀️ Back", format!("page_{}", page - 1)));
  }
  if page < total_pages {
    nav.push(InlineKeyboardButton::callback("▶️ Next", format!("page_{}", page + 1)));
  }
  if !nav.is_empty() {
    rows.push(nav);
  }

  InlineKeyboardMarkup::new(rows)
}

pub fn action_menu_view(alliance: &AllianceRow, banner: Option<&str>) -> MenuView {
  let prompt = format!("⚙️ Choose an action for alliance {}:", alliance.name);
  let text = match banner {
    Some(banner) => format!("{banner}\n\n{prompt}"),
    None => prompt,
  };
  MenuView {
    text,
    keyboard: action_menu_keyboard(alliance.chat_id.is_some()),
  }
}

fn action_menu_keyboard(has_chat: bool) -> InlineKeyboardMarkup {
  let chat_button = if has_chat {
    InlineKeyboardButton::callback("🚪 Unlink chat", "unlink_chat".to_string())
  } else {
    InlineKeyboardButton::callback("🔗 Link chat", "link_chat".to_string())
  };

  InlineKeyboardMarkup::new(vec![
    vec![InlineKeyboardButton::callback("✏️ Rename", "rename_alliance".to_string())],
    vec![InlineKeyboardButton::callback("🛠 Members", "edit_members".to_string())],
    vec![InlineKeyboardButton::callback(
      "🔁 Transfer master",
      "transfer_master".to_string(),
    )],
    vec![chat_button],
    vec![InlineKeyboardButton::callback(
      "🗑 Delete alliance",
      "delete_alliance".to_string(),
    )],
    vec![InlineKeyboardButton::callback("⬅️ Back", "back_to_alliances".to_string())],
  ])
}

pub fn create_confirm_keyboard() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
    "✅ Create",
    "create_alliance".to_string(),
  )]])
}

pub fn confirm_cancel_keyboard() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![vec![
    InlineKeyboardButton::callback("✅ Confirm", "confirm".to_string()),
    InlineKeyboardButton::callback("❌ Cancel", "cancel".to_string()),
  ]])
}

fn cancel_keyboard(label: &str) -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
    label.to_string(),
    "cancel".to_string(),
  )]])
}

pub fn rename_prompt_view() -> MenuView {
  MenuView {
    text: "✏️ Send the new alliance name:".to_string(),
    keyboard: cancel_keyboard("❌ Cancel"),
  }
}

pub fn delete_prompt_view() -> MenuView {
  MenuView {
    text: "⚠️ Are you sure? Send the exact alliance name to confirm deletion.".to_string(),
    keyboard: cancel_keyboard("❌ Cancel"),
  }
}

pub fn link_instructions_text() -> String {
  "🔗 To link a group chat, open that chat and send /confirm_chat there.\n\nThe request is valid for 5 minutes."
    .to_string()
}

fn truncate_button_text(text: &str, max_chars: usize) -> String {
  if text.chars().count() <= max_chars {
    return text.to_string();
  }
  let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
  truncated.push('…');
  truncated
}

#[cfg(test)]
mod tests {
  use teloxide::types::InlineKeyboardButton;
  use teloxide::types::InlineKeyboardButtonKind;

  use super::*;
  use crate::models::AllianceRow;
  use crate::models::AllianceSummary;

  fn summaries(count: usize) -> Vec<AllianceSummary> {
    (1..=count as i64)
      .map(|id| AllianceSummary {
        id,
        name: format!("Alliance {id}"),
      })
      .collect()
  }

  fn payload(button: &InlineKeyboardButton) -> &str {
    match &button.kind {
      InlineKeyboardButtonKind::CallbackData(data) => data,
      _ => panic!("expected a callback button"),
    }
  }

  #[test]
  fn first_page_shows_five_rows_and_next_only() {
    let keyboard = alliance_list_keyboard(&summaries(12), 1);
    let rows = &keyboard.inline_keyboard;
    assert_eq!(rows.len(), 6);
    assert_eq!(payload(&rows[0][0]), "settings_alliance_1");
    assert_eq!(payload(&rows[4][0]), "settings_alliance_5");
    let nav = &rows[5];
    assert_eq!(nav.len(), 1);
    assert_eq!(payload(&nav[0]), "page_2");
  }

  #[test]
  fn last_page_shows_remainder_and_back_only() {
    let keyboard = alliance_list_keyboard(&summaries(12), 3);
    let rows = &keyboard.inline_keyboard;
    assert_eq!(rows.len(), 3);
    assert_eq!(payload(&rows[0][0]), "settings_alliance_11");
    assert_eq!(payload(&rows[1][0]), "settings_alliance_12");
    let nav = &rows[2];
    assert_eq!(nav.len(), 1);
    assert_eq!(payload(&nav[0]), "page_2");
  }

  #[test]
  fn middle_page_shows_both_nav_controls() {
    let keyboard = alliance_list_keyboard(&summaries(12), 2);
    let nav = keyboard.inline_keyboard.last().expect("nav row");
    assert_eq!(nav.len(), 2);
    assert_eq!(payload(&nav[0]), "page_1");
    assert_eq!(payload(&nav[1]), "page_3");
  }

  #[test]
  fn out_of_range_pages_clamp_to_valid_ones() {
    let low = alliance_list_keyboard(&summaries(12), 0);
    assert_eq!(payload(&low.inline_keyboard[0][0]), "settings_alliance_1");

    let high = alliance_list_keyboard(&summaries(12), 99);
    assert_eq!(payload(&high.inline_keyboard[0][0]), "settings_alliance_11");
  }

  #[test]
  fn single_page_has_no_nav_row() {
    let keyboard = alliance_list_keyboard(&summaries(3), 1);
    assert_eq!(keyboard.inline_keyboard.len(), 3);
  }

  #[test]
  fn empty_list_still_renders_a_keyboard() {
    let keyboard = alliance_list_keyboard(&[], 1);
    assert!(keyboard.inline_keyboard.is_empty());
  }

  #[test]
  fn chat_button_flips_with_the_binding() {
    let unbound = AllianceRow {
      id: 7,
      name: "Phoenix".to_string(),
      chat_id: None,
    };
    let view = action_menu_view(&unbound, None);
    assert!(view.text.contains("Phoenix"));
    let payloads: Vec<&str> = view.keyboard.inline_keyboard.iter().flatten().map(payload).collect();
    assert!(payloads.contains(&"link_chat"));
    assert!(!payloads.contains(&"unlink_chat"));

    let bound = AllianceRow {
      id: 7,
      name: "Phoenix".to_string(),
      chat_id: Some(-100),
    };
    let view = action_menu_view(&bound, None);
    let payloads: Vec<&str> = view.keyboard.inline_keyboard.iter().flatten().map(payload).collect();
    assert!(payloads.contains(&"unlink_chat"));
    assert!(!payloads.contains(&"link_chat"));
  }

  #[test]
  fn banner_renders_before_the_prompt() {
    let view = alliance_list_view(&summaries(1), 1, Some("🗑 Alliance deleted."));
    assert!(view.text.starts_with("🗑 Alliance deleted."));
    assert!(view.text.contains("Select an alliance"));
  }

  #[test]
  fn long_names_are_truncated_on_buttons() {
    let alliances = vec![AllianceSummary {
      id: 1,
      name: "x".repeat(60),
    }];
    let keyboard = alliance_list_keyboard(&alliances, 1);
    assert!(keyboard.inline_keyboard[0][0].text.chars().count() <= 48);
  }

  #[test]
  fn link_instructions_name_the_command_and_window() {
    let text = link_instructions_text();
    assert!(text.contains("/confirm_chat"));
    assert!(text.contains("5 minutes"));
  }
}

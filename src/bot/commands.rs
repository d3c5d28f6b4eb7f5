use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
  /// Introduce the bot
  Start,
  /// Show the help text
  Help,
  /// Create a new alliance
  AddAlliance,
  /// List and manage your alliances
  MyAlliances,
  /// Link this group chat to your alliance
  ConfirmChat,
}

#[cfg(test)]
mod tests {
  use teloxide::utils::command::BotCommands;

  use super::Command;

  #[test]
  fn parses_snake_case_commands() {
    assert!(matches!(Command::parse("/start", "alliance_bot"), Ok(Command::Start)));
    assert!(matches!(
      Command::parse("/add_alliance", "alliance_bot"),
      Ok(Command::AddAlliance)
    ));
    assert!(matches!(
      Command::parse("/my_alliances", "alliance_bot"),
      Ok(Command::MyAlliances)
    ));
    assert!(matches!(
      Command::parse("/confirm_chat@alliance_bot", "alliance_bot"),
      Ok(Command::ConfirmChat)
    ));
  }
}

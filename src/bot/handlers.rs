use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use teloxide::ApiError;
use teloxide::RequestError;
use teloxide::dispatching::UpdateHandler;
use teloxide::dispatching::dialogue::Dialogue;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::types::ChatId;
use teloxide::types::Message;
use teloxide::types::MessageId;
use teloxide::utils::command::BotCommands;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::bot::Command;
use crate::bot::DialogueStorage;
use crate::bot::HandlerResult;
use crate::bot::context::AppContext;
use crate::bot::state::ConversationState;
use crate::bot::state::CreateDraft;
use crate::bot::state::DeleteTarget;
use crate::bot::state::ManageTarget;
use crate::bot::state::RenameDraft;
use crate::bot::views;
use crate::bot::views::MenuView;
use crate::service;
use crate::service::CreateError;
use crate::service::DeleteError;
use crate::service::DeleteOutcome;
use crate::service::LinkError;
use crate::service::RenameError;
use crate::service::UnlinkError;

type SharedContext = Arc<AppContext>;
type BotDialogue = Dialogue<ConversationState, DialogueStorage>;

pub fn build_schema() -> UpdateHandler<anyhow::Error> {
  let message_handler = Update::filter_message()
    .enter_dialogue::<Message, DialogueStorage, ConversationState>()
    .branch(command_branch())
    .branch(dptree::case![ConversationState::AwaitingName(draft)].endpoint(handle_name_message))
    .branch(dptree::case![ConversationState::EnteringRename(draft)].endpoint(handle_rename_message))
    .branch(dptree::case![ConversationState::ConfirmingRename(draft)].endpoint(handle_rename_message))
    .branch(dptree::case![ConversationState::ConfirmingDelete(target)].endpoint(handle_delete_message))
    .branch(dptree::endpoint(handle_idle_text));

  let callback_handler = Update::filter_callback_query()
    .enter_dialogue::<CallbackQuery, DialogueStorage, ConversationState>()
    .branch(dptree::case![ConversationState::AwaitingName(draft)].endpoint(handle_create_callback))
    .branch(dptree::case![ConversationState::SelectingAlliance { owner_tg_id }].endpoint(handle_list_callback))
    .branch(dptree::case![ConversationState::AllianceMenu(target)].endpoint(handle_menu_callback))
    .branch(dptree::case![ConversationState::EnteringRename(draft)].endpoint(handle_rename_callback))
    .branch(dptree::case![ConversationState::ConfirmingRename(draft)].endpoint(handle_rename_callback))
    .branch(dptree::case![ConversationState::ConfirmingDelete(target)].endpoint(handle_delete_callback))
    .branch(dptree::endpoint(handle_stray_callback));

  dptree::entry().branch(message_handler).branch(callback_handler)
}

fn command_branch() -> UpdateHandler<anyhow::Error> {
  dptree::entry()
    .filter_command::<Command>()
    .branch(dptree::case![Command::Start].endpoint(handle_start))
    .branch(dptree::case![Command::Help].endpoint(handle_help))
    .branch(dptree::case![Command::AddAlliance].endpoint(handle_add_alliance))
    .branch(dptree::case![Command::MyAlliances].endpoint(handle_my_alliances))
    .branch(
      dptree::case![Command::ConfirmChat]
        .chain(dptree::filter(from_group_chat))
        .chain(dptree::filter_async(sender_has_pending_link))
        .endpoint(handle_confirm_chat),
    )
}

fn from_group_chat(msg: Message) -> bool {
  msg.chat.is_group() || msg.chat.is_supergroup()
}

async fn sender_has_pending_link(msg: Message, ctx: SharedContext) -> bool {
  let Some(user) = msg.from.as_ref() else {
    return false;
  };
  match ctx.links().has_link_request(user.id.0 as i64).await {
    Ok(found) => found,
    Err(err) => {
      warn!(user_id = user.id.0 as i64, error = %err, "failed to probe for a pending link request");
      false
    },
  }
}

#[instrument(skip(bot, ctx, dialogue, msg))]
async fn handle_start(bot: Bot, dialogue: BotDialogue, ctx: SharedContext, msg: Message) -> HandlerResult {
  dialogue.reset().await?;
  let user = msg.from.as_ref().context("message missing sender")?;
  let user_id = user.id.0 as i64;
  service::register_player(ctx.db(), user_id).await?;
  info!(user_id, chat_id = %msg.chat.id, "received /start command");
  bot
    .send_message(
      msg.chat.id,
      "🤝 I help you run your game alliances.\n\nUse /add_alliance to create one and /my_alliances to manage the ones you master.",
    )
    .await?;
  Ok(())
}

#[instrument(skip(bot, msg))]
async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
  info!(chat_id = %msg.chat.id, "received /help command");
  let mut text = Command::descriptions().to_string();
  text.push_str(
    "\n\nCreate an alliance with /add_alliance and manage it from /my_alliances. To link a group chat, press \"Link chat\" in the alliance menu, then send /confirm_chat inside that chat.",
  );
  bot.send_message(msg.chat.id, text).await?;
  Ok(())
}

#[instrument(skip(bot, dialogue, msg))]
async fn handle_add_alliance(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
  let user = msg.from.as_ref().context("message missing sender")?;
  let user_id = user.id.0 as i64;
  info!(user_id, chat_id = %msg.chat.id, "received /add_alliance command");
  dialogue
    .update(ConversationState::AwaitingName(CreateDraft::new(user_id)))
    .await?;
  bot.send_message(msg.chat.id, "🏷️ Send the alliance name:").await?;
  Ok(())
}

#[instrument(skip(bot, ctx, dialogue, msg))]
async fn handle_my_alliances(bot: Bot, ctx: SharedContext, dialogue: BotDialogue, msg: Message) -> HandlerResult {
  let user = msg.from.as_ref().context("message missing sender")?;
  let user_id = user.id.0 as i64;
  info!(user_id, chat_id = %msg.chat.id, "received /my_alliances command");

  let alliances = service::list_alliances(ctx.db(), user_id).await?;
  if alliances.is_empty() {
    dialogue.reset().await?;
    bot
      .send_message(msg.chat.id, "You have no alliances yet. Send /add_alliance to create one.")
      .await?;
    return Ok(());
  }

  dialogue
    .update(ConversationState::SelectingAlliance { owner_tg_id: user_id })
    .await?;
  let view = views::alliance_list_view(&alliances, 1, None);
  bot.send_message(msg.chat.id, view.text).reply_markup(view.keyboard).await?;
  Ok(())
}

#[instrument(skip(bot, ctx, msg))]
async fn handle_confirm_chat(bot: Bot, ctx: SharedContext, msg: Message) -> HandlerResult {
  let user = msg.from.as_ref().context("message missing sender")?;
  let user_id = user.id.0 as i64;
  let chat_id = msg.chat.id.0;
  info!(user_id, chat_id, "received /confirm_chat command");

  match service::confirm_chat_link(ctx.db(), ctx.links(), user_id, chat_id).await {
    Ok(alliance_id) => {
      info!(user_id, alliance_id, chat_id, "chat link confirmed");
      bot.send_message(msg.chat.id, "✅ Chat linked to the alliance.").await?;
    },
    Err(err) => {
      if let LinkError::Storage(source) = &err {
        warn!(user_id, chat_id, error = %source, "chat link confirmation failed");
      }
      bot
        .send_message(msg.chat.id, format!("❌ {}", err.user_message()))
        .await?;
    },
  }
  Ok(())
}

#[instrument(skip(bot, dialogue, msg))]
async fn handle_name_message(bot: Bot, dialogue: BotDialogue, msg: Message, mut draft: CreateDraft) -> HandlerResult {
  let user = msg.from.as_ref().context("message missing sender")?;
  if user.id.0 as i64 != draft.owner_tg_id {
    bot
      .send_message(msg.chat.id, "Only the user who started this creation can respond.")
      .await?;
    return Ok(());
  }

  let Some(name) = message_text(&msg).map(str::trim).filter(|text| !text.is_empty()) else {
    return Ok(());
  };

  info!(user_id = draft.owner_tg_id, chat_id = %msg.chat.id, "received alliance name proposal");
  let prompt = format!("Name: {name}\n\nPress the button to create it, or send another name.");
  draft.name = Some(name.to_string());
  dialogue.update(ConversationState::AwaitingName(draft)).await?;
  bot
    .send_message(msg.chat.id, prompt)
    .reply_markup(views::create_confirm_keyboard())
    .await?;
  Ok(())
}

#[instrument(skip(bot, dialogue, msg))]
async fn handle_rename_message(bot: Bot, dialogue: BotDialogue, msg: Message, mut draft: RenameDraft) -> HandlerResult {
  let user = msg.from.as_ref().context("message missing sender")?;
  if user.id.0 as i64 != draft.owner_tg_id {
    bot
      .send_message(msg.chat.id, "Only the user who started this rename can respond.")
      .await?;
    return Ok(());
  }

  let Some(new_name) = message_text(&msg).map(str::trim).filter(|text| !text.is_empty()) else {
    return Ok(());
  };

  info!(
    user_id = draft.owner_tg_id,
    alliance_id = draft.alliance_id,
    "received rename proposal"
  );
  let prompt = format!("New name: {new_name}\n\nConfirm the rename, or send another name.");
  draft.new_name = Some(new_name.to_string());
  dialogue.update(ConversationState::ConfirmingRename(draft)).await?;
  bot
    .send_message(msg.chat.id, prompt)
    .reply_markup(views::confirm_cancel_keyboard())
    .await?;
  Ok(())
}

#[instrument(skip(bot, ctx, dialogue, msg))]
async fn handle_delete_message(
  bot: Bot,
  ctx: SharedContext,
  dialogue: BotDialogue,
  msg: Message,
  target: DeleteTarget,
) -> HandlerResult {
  let user = msg.from.as_ref().context("message missing sender")?;
  let user_id = user.id.0 as i64;
  if user_id != target.owner_tg_id {
    bot
      .send_message(msg.chat.id, "Only the user who started this deletion can respond.")
      .await?;
    return Ok(());
  }

  let Some(entered) = message_text(&msg) else {
    return Ok(());
  };

  info!(user_id, alliance_id = target.alliance_id, "received delete confirmation input");
  match service::delete_alliance(ctx.db(), user_id, target.alliance_id, entered).await {
    Ok(DeleteOutcome::Deleted { remaining }) => {
      if remaining.is_empty() {
        dialogue.reset().await?;
        bot
          .send_message(msg.chat.id, "🗑 Alliance deleted. You have no alliances left.")
          .await?;
      } else {
        dialogue
          .update(ConversationState::SelectingAlliance { owner_tg_id: user_id })
          .await?;
        let view = views::alliance_list_view(&remaining, 1, Some("🗑 Alliance deleted."));
        bot.send_message(msg.chat.id, view.text).reply_markup(view.keyboard).await?;
      }
    },
    Ok(DeleteOutcome::NameMismatch { alliance }) => {
      dialogue
        .update(ConversationState::AllianceMenu(ManageTarget {
          owner_tg_id: user_id,
          alliance_id: alliance.id,
        }))
        .await?;
      let view = views::action_menu_view(&alliance, Some("The name does not match. Deletion cancelled."));
      bot.send_message(msg.chat.id, view.text).reply_markup(view.keyboard).await?;
    },
    Err(err) => {
      if let DeleteError::Storage(source) = &err {
        warn!(user_id, alliance_id = target.alliance_id, error = %source, "failed to delete alliance");
      } else {
        dialogue.reset().await?;
      }
      bot.send_message(msg.chat.id, err.user_message()).await?;
    },
  }
  Ok(())
}

#[instrument(skip(bot, msg))]
async fn handle_idle_text(bot: Bot, msg: Message, state: ConversationState) -> HandlerResult {
  if matches!(state, ConversationState::Idle)
    && msg.chat.is_private()
    && let Some(text) = msg.text()
  {
    if text.starts_with('/') {
      return Ok(());
    }
    info!(chat_id = %msg.chat.id, "idle state received unrecognized message");
    bot
      .send_message(
        msg.chat.id,
        "I did not understand that. Use /my_alliances to manage your alliances or /help for the command list.",
      )
      .await?;
  }
  Ok(())
}

#[instrument(skip(bot, ctx, dialogue, query))]
async fn handle_create_callback(
  bot: Bot,
  ctx: SharedContext,
  dialogue: BotDialogue,
  query: CallbackQuery,
  draft: CreateDraft,
) -> HandlerResult {
  let Some(data) = query.data.as_deref() else {
    return answer_callback(&bot, &query, None).await;
  };
  let user_id = query.from.id.0 as i64;
  let message_ctx = query.message.as_ref().map(|message| (message.chat().id, message.id()));
  info!(user_id, callback = data, "handling alliance creation callback");
  let mut callback_text: Option<String> = None;

  if data == "create_alliance" {
    if user_id != draft.owner_tg_id {
      callback_text = Some("This menu belongs to another user.".to_string());
    } else {
      match service::create_alliance(ctx.db(), user_id, draft.name.as_deref()).await {
        Ok(name) => {
          dialogue.reset().await?;
          if let Some((chat_id, message_id)) = message_ctx {
            edit_text_only(&bot, chat_id, message_id, format!("✅ Alliance {name} created.")).await?;
          }
        },
        Err(err) => {
          if let CreateError::Storage(source) = &err {
            warn!(user_id, error = %source, "failed to create alliance");
          }
          callback_text = Some(err.user_message());
        },
      }
    }
  }

  answer_callback(&bot, &query, callback_text).await
}

#[instrument(skip(bot, ctx, dialogue, query))]
async fn handle_list_callback(
  bot: Bot,
  ctx: SharedContext,
  dialogue: BotDialogue,
  query: CallbackQuery,
  owner_tg_id: i64,
) -> HandlerResult {
  let Some(data) = query.data.as_deref() else {
    return answer_callback(&bot, &query, None).await;
  };
  let user_id = query.from.id.0 as i64;
  let message_ctx = query.message.as_ref().map(|message| (message.chat().id, message.id()));
  info!(user_id, callback = data, "handling alliance list callback");
  let mut callback_text: Option<String> = None;

  if user_id != owner_tg_id {
    return answer_callback(&bot, &query, Some("This menu belongs to another user.".to_string())).await;
  }

  if let Some(page) = parse_page_payload(data) {
    if let Some((chat_id, message_id)) = message_ctx {
      let alliances = service::list_alliances(ctx.db(), owner_tg_id).await?;
      let keyboard = views::alliance_list_keyboard(&alliances, page);
      if let Err(err) = bot
        .edit_message_reply_markup(chat_id, message_id)
        .reply_markup(keyboard)
        .await
        && !matches!(err, RequestError::Api(ApiError::MessageNotModified))
      {
        return Err(err.into());
      }
    }
  } else if let Some(alliance_id) = parse_settings_payload(data) {
    match service::action_menu(ctx.db(), alliance_id).await? {
      Some(alliance) => {
        dialogue
          .update(ConversationState::AllianceMenu(ManageTarget {
            owner_tg_id,
            alliance_id,
          }))
          .await?;
        if let Some((chat_id, message_id)) = message_ctx {
          edit_menu(&bot, chat_id, message_id, views::action_menu_view(&alliance, None)).await?;
        }
      },
      None => {
        warn!(user_id, alliance_id, "alliance vanished before its menu opened");
        callback_text = Some("Alliance not found.".to_string());
      },
    }
  }

  answer_callback(&bot, &query, callback_text).await
}

#[instrument(skip(bot, ctx, dialogue, query))]
async fn handle_menu_callback(
  bot: Bot,
  ctx: SharedContext,
  dialogue: BotDialogue,
  query: CallbackQuery,
  target: ManageTarget,
) -> HandlerResult {
  let Some(data) = query.data.as_deref() else {
    return answer_callback(&bot, &query, None).await;
  };
  let user_id = query.from.id.0 as i64;
  let message_ctx = query.message.as_ref().map(|message| (message.chat().id, message.id()));
  info!(
    user_id,
    alliance_id = target.alliance_id,
    callback = data,
    "handling alliance menu callback"
  );
  let mut callback_text: Option<String> = None;

  if user_id != target.owner_tg_id {
    return answer_callback(&bot, &query, Some("This menu belongs to another user.".to_string())).await;
  }

  match data {
    "rename_alliance" => {
      dialogue
        .update(ConversationState::EnteringRename(RenameDraft::new(
          target.owner_tg_id,
          target.alliance_id,
        )))
        .await?;
      if let Some((chat_id, message_id)) = message_ctx {
        edit_menu(&bot, chat_id, message_id, views::rename_prompt_view()).await?;
      }
    },
    "delete_alliance" => {
      dialogue
        .update(ConversationState::ConfirmingDelete(DeleteTarget {
          owner_tg_id: target.owner_tg_id,
          alliance_id: target.alliance_id,
        }))
        .await?;
      if let Some((chat_id, message_id)) = message_ctx {
        edit_menu(&bot, chat_id, message_id, views::delete_prompt_view()).await?;
      }
    },
    "link_chat" => match service::begin_chat_link(ctx.db(), ctx.links(), user_id, target.alliance_id).await {
      Ok(()) => {
        if let Some((chat_id, message_id)) = message_ctx {
          edit_text_only(&bot, chat_id, message_id, views::link_instructions_text()).await?;
        }
      },
      Err(err) => {
        if let LinkError::Storage(source) = &err {
          warn!(user_id, alliance_id = target.alliance_id, error = %source, "failed to store link request");
        }
        callback_text = Some(err.user_message());
      },
    },
    "unlink_chat" => match service::unbind_chat(ctx.db(), user_id, target.alliance_id).await {
      Ok(alliance) => {
        if let Some((chat_id, message_id)) = message_ctx {
          edit_menu(
            &bot,
            chat_id,
            message_id,
            views::action_menu_view(&alliance, Some("🔄 Chat unlinked from the alliance.")),
          )
          .await?;
        }
      },
      Err(err) => {
        if let UnlinkError::Storage(source) = &err {
          warn!(user_id, alliance_id = target.alliance_id, error = %source, "failed to unlink chat");
        }
        callback_text = Some(err.user_message());
      },
    },
    "edit_members" | "transfer_master" => {
      bot
        .answer_callback_query(query.id.clone())
        .text("🚧 This feature is not available yet.")
        .show_alert(true)
        .await?;
      return Ok(());
    },
    "back_to_alliances" => {
      let alliances = service::list_alliances(ctx.db(), user_id).await?;
      if alliances.is_empty() {
        dialogue.reset().await?;
        if let Some((chat_id, message_id)) = message_ctx {
          edit_text_only(
            &bot,
            chat_id,
            message_id,
            "You have no alliances left. Send /add_alliance to create one.".to_string(),
          )
          .await?;
        }
      } else {
        dialogue
          .update(ConversationState::SelectingAlliance {
            owner_tg_id: target.owner_tg_id,
          })
          .await?;
        if let Some((chat_id, message_id)) = message_ctx {
          edit_menu(&bot, chat_id, message_id, views::alliance_list_view(&alliances, 1, None)).await?;
        }
      }
    },
    _ => {},
  }

  answer_callback(&bot, &query, callback_text).await
}

#[instrument(skip(bot, ctx, dialogue, query))]
async fn handle_rename_callback(
  bot: Bot,
  ctx: SharedContext,
  dialogue: BotDialogue,
  query: CallbackQuery,
  draft: RenameDraft,
) -> HandlerResult {
  let Some(data) = query.data.as_deref() else {
    return answer_callback(&bot, &query, None).await;
  };
  let user_id = query.from.id.0 as i64;
  let message_ctx = query.message.as_ref().map(|message| (message.chat().id, message.id()));
  info!(
    user_id,
    alliance_id = draft.alliance_id,
    callback = data,
    "handling rename callback"
  );
  let mut callback_text: Option<String> = None;

  if user_id != draft.owner_tg_id {
    return answer_callback(&bot, &query, Some("This menu belongs to another user.".to_string())).await;
  }

  match data {
    "confirm" => match service::rename_alliance(ctx.db(), user_id, draft.alliance_id, draft.new_name.as_deref()).await
    {
      Ok(alliance) => {
        dialogue
          .update(ConversationState::AllianceMenu(ManageTarget {
            owner_tg_id: draft.owner_tg_id,
            alliance_id: alliance.id,
          }))
          .await?;
        if let Some((chat_id, message_id)) = message_ctx {
          let banner = format!("✏️ Alliance name updated to {}.", alliance.name);
          edit_menu(&bot, chat_id, message_id, views::action_menu_view(&alliance, Some(&banner))).await?;
        }
      },
      Err(err) => {
        match &err {
          RenameError::Storage(source) => {
            warn!(user_id, alliance_id = draft.alliance_id, error = %source, "failed to rename alliance");
          },
          RenameError::NotMaster { .. } | RenameError::Vanished { .. } => {
            dialogue.reset().await?;
          },
          RenameError::EmptyName { .. } => {},
        }
        callback_text = Some(err.user_message());
      },
    },
    "cancel" => {
      callback_text = reopen_alliance_menu(
        &bot,
        &ctx,
        &dialogue,
        message_ctx,
        draft.owner_tg_id,
        draft.alliance_id,
        "Rename cancelled.",
      )
      .await?;
    },
    _ => {},
  }

  answer_callback(&bot, &query, callback_text).await
}

#[instrument(skip(bot, ctx, dialogue, query))]
async fn handle_delete_callback(
  bot: Bot,
  ctx: SharedContext,
  dialogue: BotDialogue,
  query: CallbackQuery,
  target: DeleteTarget,
) -> HandlerResult {
  let Some(data) = query.data.as_deref() else {
    return answer_callback(&bot, &query, None).await;
  };
  let user_id = query.from.id.0 as i64;
  let message_ctx = query.message.as_ref().map(|message| (message.chat().id, message.id()));
  info!(
    user_id,
    alliance_id = target.alliance_id,
    callback = data,
    "handling delete callback"
  );
  let mut callback_text: Option<String> = None;

  if user_id != target.owner_tg_id {
    return answer_callback(&bot, &query, Some("This menu belongs to another user.".to_string())).await;
  }

  if data == "cancel" {
    callback_text = reopen_alliance_menu(
      &bot,
      &ctx,
      &dialogue,
      message_ctx,
      target.owner_tg_id,
      target.alliance_id,
      "Deletion cancelled.",
    )
    .await?;
  }

  answer_callback(&bot, &query, callback_text).await
}

#[instrument(skip(bot, query))]
async fn handle_stray_callback(bot: Bot, query: CallbackQuery) -> HandlerResult {
  let Some(data) = query.data.as_deref() else {
    return answer_callback(&bot, &query, None).await;
  };
  info!(user_id = query.from.id.0 as i64, callback = data, "callback without a live menu");

  if data == "edit_members" || data == "transfer_master" {
    bot
      .answer_callback_query(query.id.clone())
      .text("🚧 This feature is not available yet.")
      .show_alert(true)
      .await?;
    return Ok(());
  }

  let callback_text = is_stale_menu_payload(data)
    .then(|| "This menu is no longer active. Send /my_alliances to open a fresh one.".to_string());
  answer_callback(&bot, &query, callback_text).await
}

async fn reopen_alliance_menu(
  bot: &Bot,
  ctx: &SharedContext,
  dialogue: &BotDialogue,
  message_ctx: Option<(ChatId, MessageId)>,
  owner_tg_id: i64,
  alliance_id: i64,
  banner: &str,
) -> Result<Option<String>> {
  match service::action_menu(ctx.db(), alliance_id).await? {
    Some(alliance) => {
      dialogue
        .update(ConversationState::AllianceMenu(ManageTarget {
          owner_tg_id,
          alliance_id,
        }))
        .await?;
      if let Some((chat_id, message_id)) = message_ctx {
        edit_menu(bot, chat_id, message_id, views::action_menu_view(&alliance, Some(banner))).await?;
      }
      Ok(None)
    },
    None => {
      dialogue.reset().await?;
      Ok(Some("Alliance not found.".to_string()))
    },
  }
}

async fn edit_menu(bot: &Bot, chat: ChatId, message_id: MessageId, view: MenuView) -> HandlerResult {
  let request = bot.edit_message_text(chat, message_id, view.text).reply_markup(view.keyboard);
  match request.await {
    Ok(_) => Ok(()),
    Err(RequestError::Api(ApiError::MessageNotModified)) => {
      info!(chat_id = %chat, message_id = %message_id, "menu message already current");
      Ok(())
    },
    Err(err) => Err(err.into()),
  }
}

async fn edit_text_only(bot: &Bot, chat: ChatId, message_id: MessageId, text: String) -> HandlerResult {
  match bot.edit_message_text(chat, message_id, text).await {
    Ok(_) => Ok(()),
    Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
    Err(err) => Err(err.into()),
  }
}

async fn answer_callback(bot: &Bot, query: &CallbackQuery, text: Option<String>) -> HandlerResult {
  if let Some(text) = text {
    bot.answer_callback_query(query.id.clone()).text(text).await?;
  } else {
    bot.answer_callback_query(query.id.clone()).await?;
  }
  Ok(())
}

fn message_text(msg: &Message) -> Option<&str> {
  msg.text().or_else(|| msg.caption())
}

fn parse_page_payload(data: &str) -> Option<usize> {
  data.strip_prefix("page_").and_then(|raw| raw.parse().ok())
}

fn parse_settings_payload(data: &str) -> Option<i64> {
  data.strip_prefix("settings_alliance_").and_then(|raw| raw.parse().ok())
}

fn is_stale_menu_payload(data: &str) -> bool {
  matches!(
    data,
    "create_alliance" | "confirm" | "cancel" | "rename_alliance" | "delete_alliance" | "link_chat" | "unlink_chat" | "back_to_alliances"
  ) || parse_page_payload(data).is_some()
    || parse_settings_payload(data).is_some()
}

#[cfg(test)]
mod tests {
  use super::is_stale_menu_payload;
  use super::parse_page_payload;
  use super::parse_settings_payload;

  #[test]
  fn parses_page_payloads() {
    assert_eq!(parse_page_payload("page_2"), Some(2));
    assert_eq!(parse_page_payload("page_"), None);
    assert_eq!(parse_page_payload("page_x"), None);
    assert_eq!(parse_page_payload("settings_alliance_2"), None);
  }

  #[test]
  fn parses_settings_payloads() {
    assert_eq!(parse_settings_payload("settings_alliance_9"), Some(9));
    assert_eq!(parse_settings_payload("settings_alliance_"), None);
    assert_eq!(parse_settings_payload("page_9"), None);
  }

  #[test]
  fn recognizes_menu_payloads_as_stale() {
    assert!(is_stale_menu_payload("confirm"));
    assert!(is_stale_menu_payload("page_3"));
    assert!(is_stale_menu_payload("settings_alliance_12"));
    assert!(!is_stale_menu_payload("noise"));
    assert!(!is_stale_menu_payload("page_three"));
  }
}

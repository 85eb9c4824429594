//! `View` to Telegram HTML text plus inline keyboard.

use std::fmt::Write as _;

use super::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::view::{View, ViewBody};

pub const PARSE_MODE: &str = "HTML";

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn keyboard(view: &View) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: view
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton {
                        text: button.label.clone(),
                        callback_data: button.token.clone(),
                    })
                    .collect()
            })
            .collect(),
    }
}

pub fn message_text(view: &View) -> String {
    let mut text = String::new();
    if let Some(toast) = view.toast() {
        let _ = write!(text, "⚠️ <i>{}</i>\n\n", escape_html(toast));
    }

    match &view.body {
        ViewBody::MainMenu { welcome, groups } => {
            if let Some(welcome) = welcome {
                match &welcome.first_name {
                    Some(name) => {
                        let _ = write!(text, "👋 Welcome {}!\n\n", escape_html(name));
                    }
                    None => text.push_str("👋 Welcome!\n\n"),
                }
                text.push_str(
                    "🎯 <b>Master English Grammar Through Repetition</b>\n\n\
                     This bot helps you learn English by showing the same sentence \
                     in different grammatical forms. By seeing familiar content in \
                     various contexts, you'll develop natural fluency.\n\n",
                );
            }
            text.push_str("📚 <b>Main Menu</b>\n\n");
            if groups.is_empty() {
                text.push_str("No exercises are available right now.");
            } else {
                text.push_str("Choose an exercise type to begin:");
            }
        }
        ViewBody::GroupMenu {
            name,
            description,
            exercises,
        } => {
            let _ = write!(text, "📝 <b>{}</b>\n\n", escape_html(name));
            if !description.is_empty() {
                let _ = write!(text, "{}\n\n", escape_html(description));
            }
            for exercise in exercises {
                let _ = writeln!(text, "▶️ <b>{}</b>", escape_html(&exercise.title));
                if !exercise.description.is_empty() {
                    let _ = writeln!(text, "{}", escape_html(&exercise.description));
                }
                let _ = write!(text, "Total examples: {}\n\n", exercise.example_count);
            }
            text.push_str("Ready to begin?");
        }
        ViewBody::Example {
            exercise_title,
            label,
            sentence,
            position,
            total,
        } => {
            let _ = write!(
                text,
                "📖 {} · Example {}/{}\n\n<b>{}</b>\n\n📝 <i>{}</i>",
                escape_html(exercise_title),
                position,
                total,
                escape_html(label),
                escape_html(sentence)
            );
        }
        ViewBody::Completed {
            exercise_title,
            total,
        } => {
            let _ = write!(
                text,
                "🎉 <b>Congratulations!</b>\n\n\
                 You've completed all {} examples of {}!\n\n\
                 Great job mastering different ways to express the same idea. \
                 Keep practicing to build natural fluency!",
                total,
                escape_html(exercise_title)
            );
        }
    }
    text
}

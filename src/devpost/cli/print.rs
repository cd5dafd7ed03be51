use colored::Colorize;
use devpost::commands::questions::QuestionCard;
use devpost::commands::{CmdMessage, MessageLevel};
use devpost::config::DevpostConfig;
use devpost::model::Article;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const INDENT: &str = "    ";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub(super) fn render_home() -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", "Welcome to devpost".bold()));
    for (cmd, about) in [
        ("devpost new question", "Ask a question"),
        ("devpost new article", "Share an article"),
        ("devpost questions", "Find questions"),
        ("devpost articles", "Find articles"),
    ] {
        out.push_str(&format!("  {:<24} {}\n", cmd.cyan(), about));
    }
    out
}

pub(super) fn render_questions(cards: &[QuestionCard]) -> String {
    if cards.is_empty() {
        return "No questions found.\n".to_string();
    }
    let mut out = String::new();
    for card in cards {
        let q = &card.question;
        out.push_str(&header(&q.title, &q.date));
        out.push_str(&meta_line(&q.tags.to_string(), q.id.as_str()));
        for line in card.body.lines() {
            out.push_str(&format!("{}{}\n", INDENT, line));
        }
        let hint = if card.expanded {
            "Show less"
        } else if card.body != q.description {
            "Show more: --expand"
        } else {
            ""
        };
        if !hint.is_empty() {
            out.push_str(&format!("{}{}\n", INDENT, hint.dimmed()));
        }
        out.push('\n');
    }
    out
}

pub(super) fn render_articles(articles: &[&Article]) -> String {
    if articles.is_empty() {
        return "No articles found.\n".to_string();
    }
    let mut out = String::new();
    for article in articles {
        out.push_str(&header(&article.title, &article.date));
        out.push_str(&meta_line(&article.tags.to_string(), article.id.as_str()));
        for line in article.abstract_text.lines() {
            out.push_str(&format!("{}{}\n", INDENT, line));
        }
        if !article.image_url.is_empty() {
            out.push_str(&format!("{}Image: {}\n", INDENT, article.image_url.underline()));
        }
        out.push('\n');
    }
    out
}

pub(super) fn render_config(config: &DevpostConfig) -> String {
    let mut out = String::new();
    for key in DevpostConfig::KEYS {
        let value = config.get(key).unwrap_or_default();
        out.push_str(&format!("{:<16} {}\n", key, value));
    }
    out
}

/// Title on the left, date flush right.
fn header(title: &str, date: &str) -> String {
    let available = LINE_WIDTH.saturating_sub(date.width() + 1);
    let title = truncate_to_width(title, available);
    let padding = LINE_WIDTH.saturating_sub(title.width() + date.width());
    format!("{}{}{}\n", title.bold(), " ".repeat(padding), date.dimmed())
}

fn meta_line(tags: &str, id: &str) -> String {
    let tags = if tags.is_empty() { "-" } else { tags };
    format!("{}{}  {}\n", INDENT, tags.yellow(), id.dimmed())
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

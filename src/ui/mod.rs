//! Server-rendered chat pages.
//!
//! Both layouts render the same store state through the same controller;
//! they differ only in chrome:
//!
//! - [`Layout::Single`]: one pane with a "+ New Chat" button in the header
//! - [`Layout::Sidebar`]: a "My Chats" list for switching between sessions
//!
//! Templates are compiled once at startup. Every template name ends in
//! `.html`, so minijinja escapes all interpolated message text.

use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::chat::UNREACHABLE_TEXT;
use crate::session::{Message, SessionId, SessionSummary};

/// Page chrome around the chat transcript.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Single,
    #[default]
    Sidebar,
}

impl Layout {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Sidebar => "sidebar",
        }
    }

    const fn template(self) -> &'static str {
        match self {
            Self::Single => "single.html",
            Self::Sidebar => "sidebar.html",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a chat page needs.
#[derive(Debug)]
pub struct ChatPage<'a> {
    pub title: &'a str,
    pub layout: Layout,
    pub sessions: &'a [SessionSummary],
    pub active_id: Option<&'a SessionId>,
    pub messages: &'a [Message],
}

/// Compiled page templates.
#[derive(Debug)]
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("templates/base.html"))?;
        env.add_template("transcript.html", include_str!("templates/transcript.html"))?;
        env.add_template("single.html", include_str!("templates/single.html"))?;
        env.add_template("sidebar.html", include_str!("templates/sidebar.html"))?;
        Ok(Self { env })
    }

    pub fn render(&self, page: &ChatPage<'_>) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(page.layout.template())?;
        template.render(context! {
            title => page.title,
            layout => page.layout,
            sessions => page.sessions,
            active_id => page.active_id.map(SessionId::as_str).unwrap_or_default(),
            messages => page.messages,
            unreachable_text => UNREACHABLE_TEXT,
        })
    }
}

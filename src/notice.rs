//! # Notice payload delivered to a bot.
//!
//! A [`Notice`] is an immutable record of one NOTICE a bot received: who sent
//! it, which channel it was addressed to (if any) and its text. Its only
//! behavior is [`Notice::respond`], which routes a reply back through an
//! [`Outbound`] sink:
//!
//! ```text
//! channel? ──yes──► send(channel, "<nick>: <text>")   (plain text if the sender is unknown)
//!    └──no──► user? ──yes──► send(nick, text)
//!                └──no──► Err(RespondError::NoRecipient)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Mutex;
//! use fleetvisor::{Channel, Notice, Outbound, User, UserHostmask};
//!
//! #[derive(Default)]
//! struct Sent(Mutex<Vec<(String, String)>>);
//!
//! impl Outbound for Sent {
//!     fn send_message(&self, target: &str, text: &str) {
//!         self.0.lock().unwrap().push((target.into(), text.into()));
//!     }
//! }
//!
//! let notice = Notice::new(
//!     UserHostmask::parse("alice!al@example.org"),
//!     Some(User::new("alice")),
//!     Some(Channel::new("#rust")),
//!     "ping",
//! );
//! let out = Sent::default();
//! notice.respond(&out, "pong").unwrap();
//! assert_eq!(out.0.lock().unwrap()[0], ("#rust".into(), "alice: pong".into()));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::RespondError;

/// Sink for outgoing messages, normally a bot's send queue.
pub trait Outbound {
    /// Sends `text` to `target`, a channel name or a nick.
    fn send_message(&self, target: &str, text: &str);
}

/// Sender identity as it appeared on the wire: `nick!login@host`.
///
/// Server-originated notices carry a bare server name; that whole string is
/// then the nick and `login`/`host` are empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserHostmask {
    raw: Arc<str>,
    nick_end: usize,
    login_end: usize,
}

impl UserHostmask {
    /// Splits a raw hostmask into its parts. Never fails.
    pub fn parse(raw: impl Into<Arc<str>>) -> Self {
        let raw: Arc<str> = raw.into();
        let nick_end = raw.find(['!', '@']).unwrap_or(raw.len());
        let login_end = raw[nick_end..]
            .find('@')
            .map_or(raw.len(), |at| nick_end + at);
        Self {
            raw,
            nick_end,
            login_end,
        }
    }

    /// The hostmask exactly as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Nick part, or the whole string for a bare server name.
    pub fn nick(&self) -> &str {
        &self.raw[..self.nick_end]
    }

    /// Login (ident) part; empty if absent.
    pub fn login(&self) -> &str {
        self.raw[self.nick_end..self.login_end].trim_start_matches('!')
    }

    /// Host part; empty if absent.
    pub fn host(&self) -> &str {
        self.raw[self.login_end..].trim_start_matches('@')
    }
}

impl fmt::Display for UserHostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A known user on the network.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct User {
    nick: Arc<str>,
}

impl User {
    /// Creates a user known by `nick`.
    pub fn new(nick: impl Into<Arc<str>>) -> Self {
        Self { nick: nick.into() }
    }

    /// Current nick of the user.
    pub fn nick(&self) -> &str {
        &self.nick
    }
}

/// A joined channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Channel {
    name: Arc<str>,
}

impl Channel {
    /// Creates a channel named `name` (including its `#`/`&` prefix).
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Channel name, usable as a message target.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A NOTICE received by a bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    hostmask: UserHostmask,
    user: Option<User>,
    channel: Option<Channel>,
    text: Arc<str>,
}

impl Notice {
    /// Creates a notice. `channel = None` means it was addressed to the bot itself.
    pub fn new(
        hostmask: UserHostmask,
        user: Option<User>,
        channel: Option<Channel>,
        text: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            hostmask,
            user,
            channel,
            text: text.into(),
        }
    }

    /// Sender hostmask as it appeared on the wire.
    pub fn hostmask(&self) -> &UserHostmask {
        &self.hostmask
    }

    /// Sender, if the bot knows the user.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Target channel, or `None` for a notice sent directly to the bot.
    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    /// The notice text.
    pub fn message(&self) -> &str {
        &self.text
    }

    /// `true` if the notice was sent to the bot rather than to a channel.
    pub fn is_private(&self) -> bool {
        self.channel.is_none()
    }

    /// Replies to the notice through `out`.
    ///
    /// In a channel the reply goes to the channel, prefixed with the sender's
    /// nick when the sender is known. Otherwise it goes privately to the sender.
    pub fn respond(&self, out: &dyn Outbound, text: &str) -> Result<(), RespondError> {
        match (&self.channel, &self.user) {
            (Some(channel), Some(user)) => {
                out.send_message(channel.name(), &format!("{}: {text}", user.nick()));
            }
            (Some(channel), None) => out.send_message(channel.name(), text),
            (None, Some(user)) => out.send_message(user.nick(), text),
            (None, None) => return Err(RespondError::NoRecipient),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, String)>>);

    impl Outbound for Recorder {
        fn send_message(&self, target: &str, text: &str) {
            self.0.lock().unwrap().push((target.to_owned(), text.to_owned()));
        }
    }

    impl Recorder {
        fn sent(&self) -> Vec<(String, String)> {
            self.0.lock().unwrap().clone()
        }
    }

    fn pair(target: &str, text: &str) -> (String, String) {
        (target.to_owned(), text.to_owned())
    }

    #[test]
    fn hostmask_splits_nick_login_host() {
        let hm = UserHostmask::parse("alice!~al@irc.example.org");
        assert_eq!(hm.nick(), "alice");
        assert_eq!(hm.login(), "~al");
        assert_eq!(hm.host(), "irc.example.org");
        assert_eq!(hm.to_string(), "alice!~al@irc.example.org");

        let server = UserHostmask::parse("irc.libera.chat");
        assert_eq!(server.nick(), "irc.libera.chat");
        assert_eq!(server.login(), "");
        assert_eq!(server.host(), "");

        let no_login = UserHostmask::parse("bob@host");
        assert_eq!(no_login.nick(), "bob");
        assert_eq!(no_login.login(), "");
        assert_eq!(no_login.host(), "host");
    }

    #[test]
    fn channel_reply_is_addressed_to_sender() {
        let n = Notice::new(
            UserHostmask::parse("alice!al@h"),
            Some(User::new("alice")),
            Some(Channel::new("#ops")),
            "status?",
        );
        let out = Recorder::default();
        n.respond(&out, "all green").unwrap();
        assert_eq!(out.sent(), [pair("#ops", "alice: all green")]);
        assert!(!n.is_private());
        assert_eq!(n.message(), "status?");
    }

    #[test]
    fn private_reply_goes_to_sender() {
        let n = Notice::new(
            UserHostmask::parse("bob!b@h"),
            Some(User::new("bob")),
            None,
            "hi",
        );
        let out = Recorder::default();
        n.respond(&out, "hello").unwrap();
        assert_eq!(out.sent(), [pair("bob", "hello")]);
        assert!(n.is_private());
    }

    #[test]
    fn channel_reply_without_known_sender_is_unprefixed() {
        let n = Notice::new(
            UserHostmask::parse("ChanServ!cs@services"),
            None,
            Some(Channel::new("#ops")),
            "topic locked",
        );
        let out = Recorder::default();
        n.respond(&out, "ack").unwrap();
        assert_eq!(out.sent(), [pair("#ops", "ack")]);
    }

    #[test]
    fn server_notice_has_no_recipient() {
        let n = Notice::new(
            UserHostmask::parse("irc.libera.chat"),
            None,
            None,
            "*** Looking up your hostname...",
        );
        let out = Recorder::default();
        assert_eq!(n.respond(&out, "thanks"), Err(RespondError::NoRecipient));
        assert!(out.sent().is_empty());
    }
}

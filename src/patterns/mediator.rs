//! Mediator pattern: a chat room that routes every message.
//!
//! Participants never talk to each other directly. The room validates the
//! sender, delivers to inboxes, keeps the transcript and lets bots answer.

use crate::clock::{Clock, SystemClock};
use crate::feedback::Feedback;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("user name must not be blank")]
    BlankName,

    #[error("'{0}' is already in the room")]
    NameTaken(String),

    #[error("'{0}' is not in the room")]
    NotMember(String),

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("cannot send a private message to yourself")]
    SelfMessage,

    #[error("'{0}' is not an administrator")]
    NotAdmin(String),
}

/// Canned lines a bot cycles through when addressed.
const BOT_LINES: [&str; 10] = [
    "Hi! I'm the bot of this room",
    "How are you doing?",
    "Interesting conversation!",
    "Lovely weather today!",
    "Anyone want to hear a joke?",
    "I'm always online!",
    "Please keep to the room rules!",
    "Thanks for chatting!",
    "Good luck, everyone!",
    "Welcome to our room!",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Regular,
    Admin,
    Bot { next_line: usize },
}

/// How a message reached an inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Public,
    Private,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: Channel,
    pub from: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Participant {
    name: String,
    role: Role,
    inbox: Vec<Delivery>,
}

impl Participant {
    pub fn regular(name: &str) -> Result<Self, ChatError> {
        Self::new(name, Role::Regular)
    }

    pub fn admin(name: &str) -> Result<Self, ChatError> {
        Self::new(name, Role::Admin)
    }

    pub fn bot(name: &str) -> Result<Self, ChatError> {
        Self::new(name, Role::Bot { next_line: 0 })
    }

    fn new(name: &str, role: Role) -> Result<Self, ChatError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::BlankName);
        }
        Ok(Self {
            name: name.to_string(),
            role,
            inbox: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn inbox(&self) -> &[Delivery] {
        &self.inbox
    }

    fn is_bot(&self) -> bool {
        matches!(self.role, Role::Bot { .. })
    }

    /// A bot's answer to a public message, if the message asks for one.
    fn reply_to(&mut self, from: &str, text: &str, now: DateTime<Utc>) -> Option<String> {
        let Role::Bot { next_line } = &mut self.role else {
            return None;
        };
        let text = text.to_lowercase();
        let words: Vec<&str> = text.split(|c: char| !c.is_alphanumeric()).collect();
        let said = |word: &str| words.contains(&word);

        if said("hello") || said("hi") {
            Some(format!("Hello, {from}! Nice to see you!"))
        } else if said("bot") {
            let line = BOT_LINES[*next_line % BOT_LINES.len()];
            *next_line += 1;
            Some(line.to_string())
        } else if said("time") {
            Some(format!("Current time: {}", now.format("%H:%M:%S")))
        } else if said("help") {
            Some("Commands: say 'bot' to chat, 'time' for the time".to_string())
        } else {
            None
        }
    }
}

pub struct ChatRoom {
    name: String,
    members: Vec<Participant>,
    transcript: Vec<String>,
    clock: Arc<dyn Clock>,
}

impl ChatRoom {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            transcript: Vec::new(),
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join(&mut self, participant: Participant, out: &mut dyn Feedback) -> Result<(), ChatError> {
        if self.position(participant.name()).is_some() {
            return Err(ChatError::NameTaken(participant.name.clone()));
        }
        let name = participant.name.clone();
        self.members.push(participant);
        self.notice(&format!("{name} joined the room"), out);

        // Bots greet newcomers; a bot joining does not greet itself.
        let greeters: Vec<String> = self
            .members
            .iter()
            .filter(|m| m.is_bot() && m.name != name)
            .map(|m| m.name.clone())
            .collect();
        for bot in greeters {
            self.publish(&bot, "Welcome! Say 'help' for the command list", out);
        }
        Ok(())
    }

    pub fn leave(&mut self, name: &str, out: &mut dyn Feedback) -> Result<Participant, ChatError> {
        let index = self.require(name)?;
        let participant = self.members.remove(index);
        self.notice(&format!("{name} left the room"), out);
        Ok(participant)
    }

    /// Public message to everyone but the sender. Bots may answer.
    pub fn send(&mut self, sender: &str, text: &str, out: &mut dyn Feedback) -> Result<(), ChatError> {
        self.require(sender)?;
        let text = non_empty(text)?;

        let mut replies = VecDeque::new();
        self.publish_collecting(sender, text, &mut replies, out);
        // Bots answer people, never other bots.
        while let Some((bot, reply)) = replies.pop_front() {
            self.publish(&bot, &reply, out);
        }
        Ok(())
    }

    pub fn send_private(
        &mut self,
        sender: &str,
        recipient: &str,
        text: &str,
        out: &mut dyn Feedback,
    ) -> Result<(), ChatError> {
        let from = self.require(sender)?;
        let to = self
            .position(recipient)
            .ok_or_else(|| ChatError::NotMember(recipient.to_string()))?;
        if from == to {
            return Err(ChatError::SelfMessage);
        }
        let text = non_empty(text)?;

        let line = format!("[{}] [DM] {sender} -> {recipient}: {text}", self.stamp());
        self.members[to].inbox.push(Delivery {
            channel: Channel::Private,
            from: Some(sender.to_string()),
            text: text.to_string(),
        });
        self.members[from].inbox.push(Delivery {
            channel: Channel::Private,
            from: Some(sender.to_string()),
            text: format!("(to {recipient}) {text}"),
        });
        self.record(line, out);
        Ok(())
    }

    /// Admin-only notice to every member.
    pub fn announce(&mut self, admin: &str, text: &str, out: &mut dyn Feedback) -> Result<(), ChatError> {
        self.require_admin(admin)?;
        let text = non_empty(text)?;
        self.notice(&format!("IMPORTANT from {admin}: {text}"), out);
        Ok(())
    }

    /// Admin-only removal of another member.
    pub fn kick(&mut self, admin: &str, target: &str, out: &mut dyn Feedback) -> Result<Participant, ChatError> {
        self.require_admin(admin)?;
        if admin == target {
            return Err(ChatError::SelfMessage);
        }
        let index = self.require(target)?;
        let participant = self.members.remove(index);
        tracing::info!(room = %self.name, %admin, %target, "member kicked");
        self.notice(&format!("{target} was removed by {admin}"), out);
        Ok(participant)
    }

    pub fn member(&self, name: &str) -> Option<&Participant> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Member names with their role tag, in join order.
    pub fn roster(&self) -> Vec<String> {
        self.members
            .iter()
            .map(|m| {
                let tag = match m.role {
                    Role::Regular => "user",
                    Role::Admin => "admin",
                    Role::Bot { .. } => "bot",
                };
                format!("{} [{tag}]", m.name)
            })
            .collect()
    }

    /// The last `n` transcript lines.
    pub fn recent(&self, n: usize) -> &[String] {
        &self.transcript[self.transcript.len().saturating_sub(n)..]
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    fn publish(&mut self, sender: &str, text: &str, out: &mut dyn Feedback) {
        let mut ignored = VecDeque::new();
        self.publish_collecting(sender, text, &mut ignored, out);
    }

    fn publish_collecting(
        &mut self,
        sender: &str,
        text: &str,
        replies: &mut VecDeque<(String, String)>,
        out: &mut dyn Feedback,
    ) {
        let now = self.clock.now();
        let sender_is_bot = self.member(sender).is_some_and(Participant::is_bot);
        for member in self.members.iter_mut().filter(|m| m.name != sender) {
            member.inbox.push(Delivery {
                channel: Channel::Public,
                from: Some(sender.to_string()),
                text: text.to_string(),
            });
            if !sender_is_bot {
                if let Some(reply) = member.reply_to(sender, text, now) {
                    replies.push_back((member.name.clone(), reply));
                }
            }
        }
        let line = format!("[{}] {sender}: {text}", self.stamp());
        self.record(line, out);
    }

    fn notice(&mut self, text: &str, out: &mut dyn Feedback) {
        for member in &mut self.members {
            member.inbox.push(Delivery {
                channel: Channel::Notice,
                from: None,
                text: text.to_string(),
            });
        }
        let line = format!("[{}] [SYSTEM] {text}", self.stamp());
        self.record(line, out);
    }

    fn record(&mut self, line: String, out: &mut dyn Feedback) {
        out.say(&line);
        self.transcript.push(line);
    }

    fn stamp(&self) -> String {
        self.clock.now().format("%H:%M:%S").to_string()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    fn require(&self, name: &str) -> Result<usize, ChatError> {
        self.position(name)
            .ok_or_else(|| ChatError::NotMember(name.to_string()))
    }

    fn require_admin(&self, name: &str) -> Result<(), ChatError> {
        let index = self.require(name)?;
        if self.members[index].role == Role::Admin {
            Ok(())
        } else {
            Err(ChatError::NotAdmin(name.to_string()))
        }
    }
}

fn non_empty(text: &str) -> Result<&str, ChatError> {
    let text = text.trim();
    if text.is_empty() {
        Err(ChatError::EmptyMessage)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::feedback::{Silent, Transcript};
    use chrono::TimeZone;

    fn room() -> ChatRoom {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap()));
        let mut room = ChatRoom::with_clock("main", clock);
        let mut out = Silent;
        room.join(Participant::regular("alice").unwrap(), &mut out).unwrap();
        room.join(Participant::regular("bob").unwrap(), &mut out).unwrap();
        room.join(Participant::admin("root").unwrap(), &mut out).unwrap();
        room
    }

    #[test]
    fn names_are_unique_and_non_blank() {
        let mut room = room();
        assert_eq!(Participant::regular("  ").err(), Some(ChatError::BlankName));
        assert_eq!(
            room.join(Participant::regular("alice").unwrap(), &mut Silent),
            Err(ChatError::NameTaken("alice".into()))
        );
    }

    #[test]
    fn public_messages_skip_the_sender() {
        let mut room = room();
        let mut out = Transcript::new();
        room.send("alice", "morning all", &mut out).unwrap();

        assert_eq!(out.last(), Some("[15:00:00] alice: morning all"));
        let bob = room.member("bob").unwrap();
        assert_eq!(bob.inbox().last().map(|d| d.text.as_str()), Some("morning all"));
        let alice = room.member("alice").unwrap();
        assert!(alice.inbox().iter().all(|d| d.channel != Channel::Public));
    }

    #[test]
    fn private_messages_reach_only_the_recipient() {
        let mut room = room();
        room.send_private("alice", "bob", "psst", &mut Silent).unwrap();

        let root = room.member("root").unwrap();
        assert!(root.inbox().iter().all(|d| d.channel != Channel::Private));
        let bob = room.member("bob").unwrap();
        assert_eq!(bob.inbox().last().unwrap().channel, Channel::Private);
        assert_eq!(
            room.send_private("alice", "alice", "hi me", &mut Silent),
            Err(ChatError::SelfMessage)
        );
        assert_eq!(
            room.send_private("alice", "carol", "hi", &mut Silent),
            Err(ChatError::NotMember("carol".into()))
        );
    }

    #[test]
    fn outsiders_and_empty_messages_are_refused() {
        let mut room = room();
        assert_eq!(
            room.send("charlie", "let me in", &mut Silent),
            Err(ChatError::NotMember("charlie".into()))
        );
        assert_eq!(room.send("alice", "   ", &mut Silent), Err(ChatError::EmptyMessage));
    }

    #[test]
    fn only_admins_announce_and_kick() {
        let mut room = room();
        assert_eq!(
            room.announce("alice", "free pizza", &mut Silent),
            Err(ChatError::NotAdmin("alice".into()))
        );
        room.announce("root", "be polite", &mut Silent).unwrap();
        assert!(room.transcript().last().unwrap().contains("IMPORTANT from root"));

        room.kick("root", "bob", &mut Silent).unwrap();
        assert!(room.member("bob").is_none());
        assert_eq!(room.roster(), vec!["alice [user]", "root [admin]"]);
    }

    #[test]
    fn bots_welcome_and_answer_people() {
        let mut room = room();
        room.join(Participant::bot("helper").unwrap(), &mut Silent).unwrap();

        let mut out = Transcript::new();
        room.join(Participant::regular("diana").unwrap(), &mut out).unwrap();
        assert!(out.contains("helper: Welcome!"));

        out.clear();
        room.send("alice", "what time is it?", &mut out).unwrap();
        assert_eq!(out.last(), Some("[15:00:00] helper: Current time: 15:00:00"));

        out.clear();
        room.send("bob", "hey bot", &mut out).unwrap();
        room.send("bob", "bot again", &mut out).unwrap();
        assert!(out.contains(BOT_LINES[0]));
        assert!(out.contains(BOT_LINES[1]));
    }

    #[test]
    fn recent_returns_the_tail() {
        let room = room();
        assert_eq!(room.recent(1), &room.transcript()[2..]);
        assert_eq!(room.recent(50).len(), 3);
    }
}

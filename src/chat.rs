//! Chat widget state: connection lifecycle, joined rooms, per-room message
//! history and outbound message validation. The wire transport lives outside;
//! the host feeds connection events and received messages in and reads the
//! room buffers back out.

use std::collections::{BTreeMap, VecDeque};

use log;

/// Client-side message length cap, matched by the server.
pub const MAX_MESSAGE_LENGTH: usize = 100;

/// How much history one room keeps. Older messages fall off the front.
pub const MAX_ROOM_MESSAGES: usize = 250;

// --- Connection lifecycle ---

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

// --- Rooms and messages ---

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender_nick: String,
    pub text: String,
    /// Join/leave notices and other non-player lines.
    pub is_system: bool,
}

/// One joined room and its capped history.
#[derive(Clone, Debug, Default)]
pub struct ChatRoom {
    messages: VecDeque<ChatMessage>,
}

impl ChatRoom {
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn push(&mut self, message: ChatMessage) {
        if self.messages.len() >= MAX_ROOM_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
}

/// The whole chat widget. Rooms are keyed by name; `stored_rooms` is the
/// auto-join list that survives disconnects and is joined again when a
/// connection comes up.
#[derive(Clone, Debug, Default)]
pub struct ChatState {
    connection: ConnectionState,
    nick: String,
    rooms: BTreeMap<String, ChatRoom>,
    stored_rooms: Vec<String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn room(&self, name: &str) -> Option<&ChatRoom> {
        self.rooms.get(name)
    }

    pub fn room_names(&self) -> impl Iterator<Item = &String> {
        self.rooms.keys()
    }

    // --- Connection events ---

    /// The host started a connection attempt. `rooms` seeds the auto-join
    /// list.
    pub fn begin_connect(&mut self, nick: &str, rooms: &[&str]) -> Result<(), String> {
        if self.connection != ConnectionState::Disconnected {
            return Err("Already connected.".to_string());
        }
        self.nick = nick.to_string();
        self.set_stored_rooms(rooms.iter().map(|r| r.to_string()).collect());
        self.connection = ConnectionState::Connecting;
        log::info!("[Chat] Connecting as {}", nick);
        Ok(())
    }

    /// The transport came up. Every stored room is joined.
    pub fn connection_established(&mut self) {
        match self.connection {
            ConnectionState::Connecting | ConnectionState::Reconnecting => {
                self.connection = ConnectionState::Connected;
                let to_join = self.stored_rooms.clone();
                for room in to_join {
                    if let Err(err) = self.join_room(&room) {
                        log::warn!("[Chat] Auto-join of {} failed: {}", room, err);
                    }
                }
                log::info!("[Chat] Connected, {} room(s) joined", self.rooms.len());
            }
            other => {
                log::warn!("[Chat] Ignoring connect event while {:?}", other);
            }
        }
    }

    /// The transport dropped. Room histories are kept for the reconnect.
    pub fn connection_lost(&mut self) {
        if self.connection != ConnectionState::Disconnected {
            log::warn!("[Chat] Connection lost");
        }
        self.connection = ConnectionState::Disconnected;
    }

    /// The host is retrying after a drop, optionally with a new room list.
    pub fn begin_reconnect(&mut self, rooms: &[&str]) -> Result<(), String> {
        if self.connection == ConnectionState::Connecting {
            return Err("Still connecting.".to_string());
        }
        if !rooms.is_empty() {
            self.set_stored_rooms(rooms.iter().map(|r| r.to_string()).collect());
        }
        self.connection = ConnectionState::Reconnecting;
        Ok(())
    }

    // --- Rooms ---

    pub fn join_room(&mut self, name: &str) -> Result<(), String> {
        if name.trim().is_empty() {
            return Err("Room name cannot be empty.".to_string());
        }
        if !self.is_connected() {
            return Err("Not connected to chat.".to_string());
        }
        if self.rooms.contains_key(name) {
            return Err(format!("Already in {}.", name));
        }
        let mut room = ChatRoom::default();
        room.push(ChatMessage {
            sender_nick: String::new(),
            text: format!("Joined {}", name),
            is_system: true,
        });
        self.rooms.insert(name.to_string(), room);
        Ok(())
    }

    pub fn leave_room(&mut self, name: &str) -> Result<(), String> {
        if self.rooms.remove(name).is_none() {
            return Err(format!("You are not in {}.", name));
        }
        log::info!("[Chat] Left {}", name);
        Ok(())
    }

    // --- Messages ---

    /// Validates and locally echoes an outbound room message. The host sends
    /// the same text over the transport on `Ok`.
    pub fn send_message_to_room(&mut self, text: &str, room_name: &str) -> Result<(), String> {
        if text.is_empty() {
            return Err("Message cannot be empty.".to_string());
        }
        if text.len() > MAX_MESSAGE_LENGTH {
            return Err(format!("Message too long (max {} characters).", MAX_MESSAGE_LENGTH));
        }
        if !self.is_connected() {
            return Err("Not connected to chat.".to_string());
        }
        let nick = self.nick.clone();
        let Some(room) = self.rooms.get_mut(room_name) else {
            return Err("You are not in that room.".to_string());
        };
        room.push(ChatMessage { sender_nick: nick, text: text.to_string(), is_system: false });
        Ok(())
    }

    /// A message arrived from the transport. Messages for rooms we are not in
    /// are dropped.
    pub fn receive_room_message(&mut self, room_name: &str, sender_nick: &str, text: &str) {
        // Our own messages are already echoed locally on send.
        if sender_nick == self.nick && !self.nick.is_empty() {
            return;
        }
        let Some(room) = self.rooms.get_mut(room_name) else {
            log::warn!("[Chat] Dropping message for unjoined room {}", room_name);
            return;
        };
        room.push(ChatMessage {
            sender_nick: sender_nick.to_string(),
            text: text.to_string(),
            is_system: false,
        });
    }

    // --- Stored rooms ---

    pub fn stored_rooms(&self) -> &[String] {
        &self.stored_rooms
    }

    pub fn add_to_stored_rooms(&mut self, room: &str) {
        if !self.stored_rooms.iter().any(|stored| stored == room) {
            self.stored_rooms.push(room.to_string());
        }
    }

    pub fn remove_from_stored_rooms(&mut self, room: &str) {
        self.stored_rooms.retain(|stored| stored != room);
    }

    pub fn set_stored_rooms(&mut self, rooms: Vec<String>) {
        self.stored_rooms.clear();
        for room in rooms {
            self.add_to_stored_rooms(&room);
        }
    }
}

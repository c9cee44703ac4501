//! Protocol messages exchanged with the television.

use serde::{Deserialize, Serialize};

/// State of the on-screen text field the device wants input for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFieldStatus {
    /// Field counter; replies must echo it.
    pub counter: i32,
    /// Current field contents.
    #[serde(default)]
    pub value: String,
    /// Selection start.
    #[serde(default)]
    pub start: i32,
    /// Selection end.
    #[serde(default)]
    pub end: i32,
    /// Field hint, e.g. "Search".
    #[serde(default)]
    pub label: String,
}

/// One edit inside an IME batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImeEdit {
    pub insert: i32,
    pub start: i32,
    pub end: i32,
    pub value: String,
}

/// A batch of text edits for the focused field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImeBatchEdit {
    pub ime_counter: i32,
    pub field_counter: i32,
    pub edits: Vec<ImeEdit>,
}

impl ImeBatchEdit {
    /// Zero-length edit at the cursor, claiming the keyboard session.
    pub fn acknowledge(ctx: ImeAckContext) -> Self {
        Self {
            ime_counter: ctx.counter,
            field_counter: ctx.counter,
            edits: vec![ImeEdit {
                insert: 1,
                start: ctx.cursor,
                end: ctx.cursor,
                value: String::new(),
            }],
        }
    }
}

/// Counters needed to answer a keyboard-show request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImeAckContext {
    pub counter: i32,
    pub cursor: i32,
}

impl From<&TextFieldStatus> for ImeAckContext {
    fn from(field: &TextFieldStatus) -> Self {
        Self {
            counter: field.counter,
            cursor: field.end,
        }
    }
}

/// Messages of the remote-control channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteMessage {
    /// Device asks for keyboard input on a text field.
    ImeShowRequest { field: TextFieldStatus },
    /// Text edits for the focused field.
    ImeBatchEdit(ImeBatchEdit),
    /// Key press.
    KeyInject { key_code: String },
    /// App launch by deep link.
    AppLink { link: String },
    /// Liveness probe; the device expects a pong.
    Ping { val: u32 },
    Pong { val: u32 },
}

impl RemoteMessage {
    /// Key press message, e.g. for `KEYCODE_HOME`.
    pub fn key(key_code: impl Into<String>) -> Self {
        Self::KeyInject {
            key_code: key_code.into(),
        }
    }

    /// App launch message for a package name or deep link.
    pub fn app_link(link: impl Into<String>) -> Self {
        Self::AppLink { link: link.into() }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ImeShowRequest { .. } => "ime_show_request",
            Self::ImeBatchEdit(_) => "ime_batch_edit",
            Self::KeyInject { .. } => "key_inject",
            Self::AppLink { .. } => "app_link",
            Self::Ping { .. } => "ping",
            Self::Pong { .. } => "pong",
        }
    }
}

//! Diagnostic messages anchored to lines.
//!
//! Messages reported for a line are grouped in a [`MessageBundle`] stored in that line's
//! [`LineInfo`]. A bundle has a stable [`BundleId`] assigned when it is created. Since the bundle
//! travels with its line record when the line map is patched, the id survives edits that shift
//! line numbers, and views anchored to it do not need to be rebuilt.

use crate::line_info::LineInfo;
use crate::line_map::LineMap;

/// Stable identity of a [`MessageBundle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BundleId(u64);

impl BundleId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Message categories, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageCategory {
    /// Live (e.g. evaluation) output.
    Live,
    /// Error.
    Error,
    /// Warning.
    Warning,
    /// Informational note.
    Informational,
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Category.
    pub category: MessageCategory,
    /// Number of chars the message refers to, from the start of the line's content.
    pub length: usize,
    /// One-line summary.
    pub summary: String,
    /// Optional longer description.
    pub description: Option<String>,
}

impl Message {
    /// Create a message without description.
    pub fn new(category: MessageCategory, length: usize, summary: impl Into<String>) -> Self {
        Self {
            category,
            length,
            summary: summary.into(),
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The messages of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBundle {
    id: BundleId,
    messages: Vec<Message>,
}

impl MessageBundle {
    /// Stable identity.
    pub fn id(&self) -> BundleId {
        self.id
    }

    /// Messages, in the order they were reported.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The highest-precedence category present.
    pub fn primary_category(&self) -> Option<MessageCategory> {
        self.messages.iter().map(|m| m.category).min()
    }
}

/// Change notifications for message bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEvent {
    /// A bundle was created or its messages changed.
    Changed {
        /// Bundle identity.
        id: BundleId,
        /// Line the bundle is attached to.
        line: usize,
    },
    /// A bundle was dropped, because its last message was retracted or its line disappeared.
    Removed {
        /// Bundle identity.
        id: BundleId,
    },
}

/// Allocates bundle ids and manipulates the bundles stored in a line map.
#[derive(Debug, Default)]
pub struct MessageIndex {
    next_id: u64,
}

impl MessageIndex {
    /// Create an index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `message` to `line`, creating the line's bundle if necessary.
    ///
    /// Returns `None` (and drops the message) if the line does not exist.
    pub fn add(
        &mut self,
        lines: &mut LineMap<LineInfo>,
        message: Message,
        line: usize,
    ) -> Option<BundleId> {
        let info = lines.info_mut(line)?;
        let bundle = info.message_bundle.get_or_insert_with(|| {
            self.next_id += 1;
            MessageBundle {
                id: BundleId(self.next_id),
                messages: Vec::new(),
            }
        });
        bundle.messages.push(message);
        Some(bundle.id)
    }

    /// Retract `message` from whichever line holds it.
    ///
    /// This scans all lines; do not call it on a per-keystroke path. Returns the bundle the
    /// message was removed from and its line. A bundle that becomes empty is dropped.
    pub fn remove(lines: &mut LineMap<LineInfo>, message: &Message) -> Option<(BundleId, usize)> {
        lines.infos_mut().find_map(|(line, info)| {
            let bundle = info.message_bundle.as_mut()?;
            let position = bundle.messages.iter().position(|m| m == message)?;
            bundle.messages.remove(position);
            let id = bundle.id;
            if bundle.messages.is_empty() {
                info.message_bundle = None;
            }
            Some((id, line))
        })
    }

    /// The bundle of `line`.
    pub fn messages(lines: &LineMap<LineInfo>, line: usize) -> Option<&MessageBundle> {
        lines.info(line)?.message_bundle.as_ref()
    }

    /// Drop all messages of `line`, returning the id of the dropped bundle.
    pub fn remove_messages(lines: &mut LineMap<LineInfo>, line: usize) -> Option<BundleId> {
        lines
            .info_mut(line)?
            .message_bundle
            .take()
            .map(|bundle| bundle.id)
    }

    /// The line a bundle is currently attached to.
    pub fn line_of_bundle(lines: &LineMap<LineInfo>, id: BundleId) -> Option<usize> {
        lines.iter().position(|record| {
            record
                .info
                .message_bundle
                .as_ref()
                .is_some_and(|bundle| bundle.id == id)
        })
    }
}

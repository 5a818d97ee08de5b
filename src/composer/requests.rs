use std::sync::Mutex;

/// Notifications the editor raises from its overridden `:w` / `:wq` / `:q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Save,
    SaveThenQuit,
    Quit,
}

impl Trigger {
    pub const ALL: [Trigger; 3] = [Trigger::Save, Trigger::SaveThenQuit, Trigger::Quit];

    /// RPC notification name sent by the editor-side user command.
    pub fn name(self) -> &'static str {
        match self {
            Self::Save => "scrbl_write",
            Self::SaveThenQuit => "scrbl_write_quit",
            Self::Quit => "scrbl_quit",
        }
    }

    /// Editor user command that sends this notification.
    pub fn command(self) -> &'static str {
        match self {
            Self::Save => "ScrblWrite",
            Self::SaveThenQuit => "ScrblWriteQuit",
            Self::Quit => "ScrblQuit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingRequests {
    pub save: bool,
    pub quit: bool,
    pub quit_after_save: bool,
}

impl PendingRequests {
    pub fn is_empty(&self) -> bool {
        !self.save && !self.quit && !self.quit_after_save
    }

    /// The session should end once this batch is handled.
    pub fn wants_exit(&self) -> bool {
        self.quit || self.quit_after_save
    }
}

/// Flags shared between the RPC notification handler and the host poll.
#[derive(Debug, Default)]
pub struct RequestFlags {
    inner: Mutex<PendingRequests>,
}

impl RequestFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, trigger: Trigger) {
        let mut pending = self.lock();
        match trigger {
            Trigger::Save => pending.save = true,
            Trigger::SaveThenQuit => {
                pending.save = true;
                pending.quit_after_save = true;
            }
            Trigger::Quit => pending.quit = true,
        }
    }

    /// Returns the pending flags and clears them in one critical section.
    pub fn take(&self) -> PendingRequests {
        std::mem::take(&mut *self.lock())
    }

    pub fn clear(&self) {
        *self.lock() = PendingRequests::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PendingRequests> {
        // A poisoned lock still holds plain bools; keep using them.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

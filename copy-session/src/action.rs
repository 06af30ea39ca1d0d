//! Per-action in-flight tracking.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{SessionError, SessionResult};

/// User actions that trigger asynchronous work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Persist a user-entered credential.
    SaveCredential,
    /// Pre-fill the form from the product image.
    AnalyzeImage,
    /// Generate copy for the selected triggers.
    GenerateCopy,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SaveCredential => "save credential",
            Self::AnalyzeImage => "image analysis",
            Self::GenerateCopy => "copy generation",
        })
    }
}

/// Whether an action currently has a call outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionState {
    /// Ready to be triggered.
    Idle,
    /// A call is in flight; new submissions are refused.
    Loading,
}

/// One in-flight flag per [`ActionKind`].
#[derive(Debug, Default)]
pub(crate) struct ActionFlags {
    save_credential: AtomicBool,
    analyze_image: AtomicBool,
    generate_copy: AtomicBool,
}

impl ActionFlags {
    fn flag(&self, kind: ActionKind) -> &AtomicBool {
        match kind {
            ActionKind::SaveCredential => &self.save_credential,
            ActionKind::AnalyzeImage => &self.analyze_image,
            ActionKind::GenerateCopy => &self.generate_copy,
        }
    }

    pub(crate) fn state(&self, kind: ActionKind) -> ActionState {
        if self.flag(kind).load(Ordering::Acquire) {
            ActionState::Loading
        } else {
            ActionState::Idle
        }
    }

    /// Marks `kind` as loading until the returned guard is dropped.
    pub(crate) fn begin(&self, kind: ActionKind) -> SessionResult<InFlight<'_>> {
        let flag = self.flag(kind);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::ActionInFlight(kind))?;
        debug!(action = %kind, "action started");
        Ok(InFlight { flag, kind })
    }
}

/// Clears the in-flight flag on drop, whatever the outcome.
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
    kind: ActionKind,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!(action = %self.kind, "action finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_guard_drops() {
        let flags = ActionFlags::default();
        let guard = flags.begin(ActionKind::GenerateCopy).unwrap();
        assert_eq!(flags.state(ActionKind::GenerateCopy), ActionState::Loading);
        assert!(matches!(
            flags.begin(ActionKind::GenerateCopy),
            Err(SessionError::ActionInFlight(ActionKind::GenerateCopy))
        ));

        drop(guard);
        assert_eq!(flags.state(ActionKind::GenerateCopy), ActionState::Idle);
        assert!(flags.begin(ActionKind::GenerateCopy).is_ok());
    }

    #[test]
    fn actions_are_independent() {
        let flags = ActionFlags::default();
        let _copy = flags.begin(ActionKind::GenerateCopy).unwrap();
        assert!(flags.begin(ActionKind::AnalyzeImage).is_ok());
        assert_eq!(flags.state(ActionKind::SaveCredential), ActionState::Idle);
    }
}

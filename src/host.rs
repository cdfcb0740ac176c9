//! The collaborator interface the embedding host implements.
//!
//! The engine is an embedded component: the game client supplies session
//! state, visible players, configuration storage and user notification. This
//! trait is consumed here and implemented by the host glue (tests provide
//! fakes).

/// Configuration key holding the local user's pronoun.
pub const PRONOUN_KEY: &str = "pronoun";

/// Prefix for per-identity authorization tokens; the hashed id is appended.
pub const API_KEY_PREFIX: &str = "apikey.";

/// Who performed a configuration write.
///
/// The engine's own rollback writes are tagged [`WriteOrigin::Engine`] so
/// the resulting change notification never re-triggers a publish. Hosts that
/// cannot tell the difference may tag everything `User`; the reconciler's
/// rolled-back state still absorbs the echo of its own revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOrigin {
    /// The user changed the value through the host UI
    User,
    /// The engine wrote the value (rollback)
    Engine,
}

/// Host services consumed by the engine.
pub trait HostApi: Send + Sync {
    /// Whether the session is currently authenticated.
    fn is_logged_in(&self) -> bool;

    /// Raw display name of the local user, when resolvable.
    fn local_display_name(&self) -> Option<String>;

    /// Raw names currently worth resolving: nearby players, clan rosters,
    /// chat-channel members, friends list. The host aggregates its sources
    /// behind this single method.
    fn visible_identifiers(&self) -> Vec<String>;

    /// Read a value from the host configuration store.
    fn config_value(&self, key: &str) -> Option<String>;

    /// Write a value to the host configuration store.
    fn set_config_value(&self, key: &str, value: &str);

    /// Show a short message to the user.
    fn notify_user(&self, text: &str);
}

//! Trip session management.
//!
//! Each browser tab owns one in-memory [`TripSession`]: the append-only
//! conversation, the current itinerary and the transient UI toggles. Nothing
//! is persisted; a restart forgets every session.
//!
//! # Example
//!
//! ```rust
//! use glossy_travel::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.create();
//!
//! // Sessions open with the model's greeting.
//! assert_eq!(session.message_count(), 1);
//! ```

mod trip;

pub use trip::{DEFAULT_SESSION_TIMEOUT, SessionStore, TripSession, TripSnapshot};

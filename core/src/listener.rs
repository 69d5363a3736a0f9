//! Hook invoked after a successful login.

use crate::envelope::Envelope;

/// Receives the full login envelope once the client has stored the token,
/// e.g. to persist the token outside the process.
pub trait AuthListener: Send + Sync {
    fn on_authenticated(&self, envelope: &Envelope);
}

impl<F> AuthListener for F
where
    F: Fn(&Envelope) + Send + Sync,
{
    fn on_authenticated(&self, envelope: &Envelope) {
        self(envelope)
    }
}

//! The seam between token-change detection and its consumers.

use crate::{Element, Token};

/// Receives token transitions from a [`TokenNotifier`].
pub trait TokenObserverDelegate {
    /// `token` is now present in the watched attribute.
    fn token_matched(&mut self, token: &Token);

    /// `token` is no longer present in the watched attribute.
    fn token_unmatched(&mut self, token: &Token);
}

/// Detects token add/remove transitions for one element + attribute pair.
///
/// Implementations report transitions synchronously through the delegate
/// passed to [`start`](Self::start) and [`refresh`](Self::refresh). After
/// [`stop`](Self::stop) no transitions are reported until the next `start`.
pub trait TokenNotifier {
    fn element(&self) -> &Element;

    fn attribute_name(&self) -> &str;

    fn started(&self) -> bool;

    /// Begin watching. Calling this while started has no effect.
    fn start(&mut self, delegate: &mut dyn TokenObserverDelegate);

    /// Pause watching. Calling this while stopped has no effect.
    fn stop(&mut self);

    /// Re-read the current token set and report drift since the last report.
    fn refresh(&mut self, delegate: &mut dyn TokenObserverDelegate);
}

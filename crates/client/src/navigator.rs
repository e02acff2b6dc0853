//! Navigation hook invoked when the API rejects the session.

/// Moves the user to another screen.
///
/// The HTTP boundary calls [`Navigator::navigate`] with the configured login
/// path right after tearing down a rejected session. A GUI would switch
/// routes; the CLI tells the user to sign in again.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigation requested");
    }
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path);
    }
}

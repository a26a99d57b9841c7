//! Page navigation capability handed to the controller.

/// Moves the host page to another URL.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, url: &str) {
        self(url)
    }
}

/// Navigator that only records intent in the log.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, url: &str) {
        tracing::info!(url, "Navigation requested");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn closures_are_navigators() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let nav: Box<dyn Navigator> = Box::new(move |url: &str| {
            sink.lock().unwrap().push(url.to_string());
        });
        nav.navigate("/pricing");
        assert_eq!(*seen.lock().unwrap(), vec!["/pricing".to_string()]);
    }
}

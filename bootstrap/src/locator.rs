use application::dispatcher::Dispatcher;
use application_ports::dispatch::DispatchPort;
use presentation::application_ports::Locator;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct ApplicationPortLocator {
    pub(crate) dispatcher: Arc<Dispatcher>,
}

impl ApplicationPortLocator {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl Locator for ApplicationPortLocator {
    #[instrument(level = "trace", skip(self))]
    fn get_dispatch_port(&self) -> Arc<dyn DispatchPort + Send + Sync> {
        self.dispatcher.clone()
    }
}

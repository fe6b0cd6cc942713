use application_ports::dispatch::DispatchPort;
use std::sync::Arc;

pub trait Locator {
    fn get_dispatch_port(&self) -> Arc<dyn DispatchPort + Send + Sync>;
}

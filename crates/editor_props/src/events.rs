use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Notifications emitted by the property service.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum PropsEvent {
    /// A bulk `set_props_configs` call finished.
    ConfigsChanged,
}

/// Fan-out of [`PropsEvent`]s to any number of subscribers.
#[derive(Debug, Default)]
pub(crate) struct Listeners {
    senders: Vec<UnboundedSender<PropsEvent>>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self) -> UnboundedReceiver<PropsEvent> {
        let (tx, rx) = unbounded_channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver to every subscriber, forgetting the ones that hung up.
    pub(crate) fn emit(&mut self, event: PropsEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn clear(&mut self) {
        self.senders.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}

//! Notification sinks
//!
//! The monitor hands every lifecycle event to an `EventSink` from its worker
//! thread and waits for `deliver` to return before finishing the cycle. There
//! is no queue in between: a sink that blocks stalls the monitoring loop. Sinks
//! that do slow work should hand events off, e.g. through `ChannelSink`.

use crate::models::LifecycleEvent;
use anyhow::{anyhow, Result};
use std::sync::mpsc::Sender;

/// Receiver of process lifecycle events
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: &LifecycleEvent) -> Result<()>;
}

impl<F> EventSink for F
where
    F: Fn(&LifecycleEvent) -> Result<()> + Send + Sync,
{
    fn deliver(&self, event: &LifecycleEvent) -> Result<()> {
        self(event)
    }
}

/// Forwards events into an mpsc channel so a consumer thread can process
/// them without holding up the monitor.
pub struct ChannelSink {
    sender: Sender<LifecycleEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<LifecycleEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn deliver(&self, event: &LifecycleEvent) -> Result<()> {
        self.sender
            .send(event.clone())
            .map_err(|_| anyhow!("event receiver has been dropped"))
    }
}

/// Delivers each event to every subscriber in registration order.
///
/// A failing subscriber does not prevent later subscribers from receiving the
/// event; the first failure is reported once all have been tried.
#[derive(Default)]
pub struct BroadcastSink {
    subscribers: Vec<Box<dyn EventSink>>,
}

impl BroadcastSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<S: EventSink + 'static>(&mut self, sink: S) {
        self.subscribers.push(Box::new(sink));
    }

    pub fn with<S: EventSink + 'static>(mut self, sink: S) -> Self {
        self.subscribe(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl EventSink for BroadcastSink {
    fn deliver(&self, event: &LifecycleEvent) -> Result<()> {
        let mut first_error = None;
        for subscriber in &self.subscribers {
            if let Err(e) = subscriber.deliver(event) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    fn started(pid: u32, name: &str) -> LifecycleEvent {
        LifecycleEvent::Started { pid, name: name.to_string() }
    }

    #[test]
    fn test_closure_sink_receives_event() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sink = move |event: &LifecycleEvent| -> Result<()> {
            seen_clone.lock().unwrap().push(event.clone());
            Ok(())
        };

        sink.deliver(&started(1, "init")).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![started(1, "init")]);
    }

    #[test]
    fn test_channel_sink_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);

        sink.deliver(&started(1, "init")).unwrap();
        sink.deliver(&LifecycleEvent::Terminated { name: "init".into() }).unwrap();

        assert_eq!(rx.recv().unwrap(), started(1, "init"));
        assert_eq!(rx.recv().unwrap(), LifecycleEvent::Terminated { name: "init".into() });
    }

    #[test]
    fn test_channel_sink_reports_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let sink = ChannelSink::new(tx);

        assert!(sink.deliver(&started(1, "init")).is_err());
    }

    #[test]
    fn test_broadcast_delivers_to_all_subscribers_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = order.clone();
        let second = order.clone();

        let sink = BroadcastSink::new()
            .with(move |_: &LifecycleEvent| -> Result<()> {
                first.lock().unwrap().push("first");
                Ok(())
            })
            .with(move |_: &LifecycleEvent| -> Result<()> {
                second.lock().unwrap().push("second");
                Ok(())
            });

        assert_eq!(sink.len(), 2);
        sink.deliver(&started(1, "init")).unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_broadcast_continues_after_failing_subscriber() {
        let (tx, rx) = mpsc::channel();
        let sink = BroadcastSink::new()
            .with(|_: &LifecycleEvent| -> Result<()> { Err(anyhow!("subscriber down")) })
            .with(ChannelSink::new(tx));

        let result = sink.deliver(&started(7, "worker"));

        assert!(result.is_err(), "Failure should still be reported");
        assert_eq!(rx.try_recv().unwrap(), started(7, "worker"));
    }

    #[test]
    fn test_empty_broadcast_accepts_events() {
        let sink = BroadcastSink::new();
        assert!(sink.is_empty());
        assert!(sink.deliver(&started(1, "init")).is_ok());
    }
}

//! Arbitration decisions are visible through `tracing`.

use std::fmt;
use std::sync::{Arc, Mutex};

use podctl_core::ControlConfig;
use podctl_web::GestureAdapter;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Clone, Default)]
struct MessageCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for MessageCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.messages.lock().unwrap().push(message);
        }
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<String> {
    let layer = MessageCapture::default();
    let messages = Arc::clone(&layer.messages);
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let out = messages.lock().unwrap().clone();
    out
}

#[test]
fn multi_pointer_pan_is_logged() {
    let messages = capture(|| {
        let mut adapter = GestureAdapter::new(ControlConfig::default(), 800.0);
        adapter.on_pan_start(1);
        adapter.on_pan_update(-20.0, 2);
    });
    assert!(
        messages
            .iter()
            .any(|m| m == "pan disabled: multiple pointers"),
        "{messages:?}"
    );
    assert!(messages.iter().any(|m| m == "pan recognizer toggled"));
}

#[test]
fn quantizer_switch_is_logged() {
    let messages = capture(|| {
        let mut adapter = GestureAdapter::new(ControlConfig::default(), 800.0);
        adapter.on_rotation_start(0.0);
        adapter.on_rotation_update(0.1);
    });
    assert!(messages.iter().any(|m| m == "rotation quantizer switched"));
    assert!(messages.iter().any(|m| m == "rotation delta applied"));
}

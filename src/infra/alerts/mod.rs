pub mod webhook_alerts;

pub use webhook_alerts::{WebhookAlertSink, WebhookKind};

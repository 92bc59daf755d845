//! Shapes groups of alerts into the data given to notification templates.
//!
//! Alerts are grouped into [`TemplateData`], which is then extended into
//! [`ExtendedData`]: private labels and annotations are removed, and each
//! alert gains links to its dashboard, panel and a pre-filled silence.
//! A [`Renderer`] resolves notification template text over the result.

pub mod alert;
mod defaults;
mod error;
pub mod extend;
pub mod kv;
pub mod render;
pub mod template;
pub mod urls;

pub use alert::{Alert, Fingerprint, Status};
pub use error::Error;
pub use extend::{
    extend_alert, extend_data, ExtendedAlert, ExtendedAlerts, ExtendedData, Image, ImageStore,
    NoImages,
};
pub use kv::{is_private_key, KV};
pub use render::{Renderer, TextResolver};
pub use template::{Notification, TemplateAlert, TemplateData};

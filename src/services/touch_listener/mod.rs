mod contact_tracker;
mod dry_touch_listener;
mod touch_listener;
mod r#trait;

pub use self::r#trait::{create_touch_listener, TouchListenerTrait};

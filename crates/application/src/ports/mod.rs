mod admin_triggers;

pub use admin_triggers::AdminTriggers;

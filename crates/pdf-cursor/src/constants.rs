//! Default key repeat timing

use std::time::Duration;

/// How long a key must be held before it starts repeating
pub const TRIGGER_DELAY: Duration = Duration::from_millis(400);

/// Time between repeats once a key is repeating
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(100);

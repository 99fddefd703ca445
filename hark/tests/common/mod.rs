#![allow(dead_code)]

use hark::{Cancellable, Event, EventBus, EventType, Extends, Registrar};
use std::sync::Arc;

// ============================================================================
// Tracing
// ============================================================================

/// Installs a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn setup(label: &str) -> (Arc<EventBus>, Registrar) {
    init_tracing();
    let bus = Arc::new(EventBus::new());
    let registrar = Registrar::new(label, bus.clone());
    (bus, registrar)
}

// ============================================================================
// Test Event Types
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub name: String,
    pub is_op: bool,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_op: false,
        }
    }

    pub fn op(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_op: true,
        }
    }
}

/// Supertype of every event caused by a player.
pub trait PlayerEvent: Event {
    fn player(&self) -> &Player;
}

macro_rules! player_event {
    (@supertype $ty:ident) => {
        impl PlayerEvent for $ty {
            fn player(&self) -> &Player {
                &self.player
            }
        }

        impl Extends<dyn PlayerEvent> for $ty {
            fn upcast(&self) -> &(dyn PlayerEvent + 'static) {
                self
            }

            fn upcast_mut(&mut self) -> &mut (dyn PlayerEvent + 'static) {
                self
            }
        }
    };
    ($ty:ident) => {
        impl EventType for $ty {
            const NAME: &'static str = stringify!($ty);
        }

        impl Event for $ty {
            fn event_name(&self) -> &'static str {
                Self::NAME
            }
        }

        player_event!(@supertype $ty);
    };
    ($ty:ident, cancellable) => {
        impl EventType for $ty {
            const NAME: &'static str = stringify!($ty);
            const CANCELLABLE: bool = true;
        }

        impl Event for $ty {
            fn event_name(&self) -> &'static str {
                Self::NAME
            }

            fn as_cancellable(&self) -> Option<&dyn Cancellable> {
                Some(self)
            }

            fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
                Some(self)
            }
        }

        impl Cancellable for $ty {
            fn is_cancelled(&self) -> bool {
                self.cancelled
            }

            fn set_cancelled(&mut self, cancelled: bool) {
                self.cancelled = cancelled;
            }
        }

        player_event!(@supertype $ty);
    };
}

#[derive(Debug)]
pub struct Join {
    pub player: Player,
    pub message: Option<String>,
    pub cancelled: bool,
}

impl Join {
    pub fn new(player: Player) -> Self {
        let message = Some(format!("{} joined", player.name));
        Self {
            player,
            message,
            cancelled: false,
        }
    }
}

player_event!(Join, cancellable);

#[derive(Debug)]
pub struct Quit {
    pub player: Player,
}

player_event!(Quit);

#[derive(Debug)]
pub struct Break {
    pub player: Player,
    pub block: &'static str,
    pub cancelled: bool,
}

impl Break {
    pub fn new(player: Player, block: &'static str) -> Self {
        Self {
            player,
            block,
            cancelled: false,
        }
    }
}

player_event!(Break, cancellable);

#[derive(Debug)]
pub struct BucketFill {
    pub player: Player,
    pub cancelled: bool,
}

impl BucketFill {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            cancelled: false,
        }
    }
}

player_event!(BucketFill, cancellable);

#[derive(Debug)]
pub struct Chat {
    pub player: Player,
    pub text: String,
}

impl Chat {
    pub fn new(player: Player, text: &str) -> Self {
        Self {
            player,
            text: text.to_string(),
        }
    }
}

player_event!(Chat);

/// A cancellable event outside the player hierarchy.
#[derive(Debug, Default)]
pub struct Weather {
    pub raining: bool,
    pub cancelled: bool,
}

impl EventType for Weather {
    const NAME: &'static str = "Weather";
    const CANCELLABLE: bool = true;
}

impl Event for Weather {
    fn event_name(&self) -> &'static str {
        Self::NAME
    }

    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        Some(self)
    }

    fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
        Some(self)
    }
}

impl Cancellable for Weather {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

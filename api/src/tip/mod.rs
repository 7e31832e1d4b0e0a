//! The tip flow: a pure state machine and the driver that runs its effects.

pub mod driver;
pub mod machine;

pub use driver::drive;
pub use driver::settle;
pub use machine::TipEffect;
pub use machine::TipEvent;
pub use machine::TipMachine;
pub use machine::TipPhase;
pub use machine::DEBOUNCE_WINDOW;

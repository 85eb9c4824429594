//! Navigation core
//!
//! - `state`: `NavigationState` (storage form) and `Screen` (validated form)
//! - `action`: `NavAction`, the intents a button can carry
//! - `codec`: action token encoding and the nom-based decoder
//! - `machine`: the transition function
//!
//! ## Usage Example
//!
//! ```rust
//! use buildup_bot::catalog::ExerciseCatalog;
//! use buildup_bot::navigation::{codec, StateMachine};
//!
//! let catalog = ExerciseCatalog::builtin().unwrap();
//! let machine = StateMachine::new(&catalog);
//!
//! let decoded = codec::decode("v1_x_grammar%5Fvariations_paint%5Fthe%5Fhouse").unwrap();
//! let transition = machine.apply(&machine.start().screen, &decoded.action);
//! assert_eq!(transition.screen.to_state().example_index(), 0);
//! ```

pub mod action;
pub mod codec;
pub mod machine;
pub mod state;

pub use action::{NavAction, Step};
pub use codec::{decode, encode, DecodedToken};
pub use machine::{StateMachine, Transition};
pub use state::{NavigationState, Screen};

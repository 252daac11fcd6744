//! # interax-prompt-widgets
//!
//! Ready-made prompts on top of `interax-prompt-fwk`.
//!
//! | Prompt       | Answer    |
//! |--------------|-----------|
//! | [`select`]   | the picked choice's value |
//! | [`confirm`]  | `bool`    |
//! | [`input`]    | `String`  |
//! | [`password`] | `String`  |
//!
//! ## Quick Start
//!
//! ```ignore
//! use interax_prompt_widgets::{select, Choice, SelectConfig, SelectItem, Separator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let choices: Vec<SelectItem<&str>> = vec![
//!         Choice::new("npm", "npm").into(),
//!         Choice::new("yarn", "yarn").into(),
//!         Separator::default().into(),
//!         Choice::new("jspm", "jspm").disabled().into(),
//!     ];
//!     let manager = select().run(SelectConfig::new("Package manager", choices)).await?;
//!     println!("{manager}");
//!     Ok(())
//! }
//! ```

pub mod confirm;
pub mod input;
pub mod password;
pub mod select;
pub mod separator;
mod submit;

pub use confirm::{confirm, ConfirmConfig, ConfirmTransformer};
pub use input::{input, InputConfig, InputTransformer};
pub use password::{password, PasswordConfig};
pub use select::{select, Choice, Disabled, SelectConfig, SelectItem};
pub use separator::Separator;

//! Smaller design-pattern exercises.
//!
//! Each module is self-contained and talks to the outside world through
//! the [`Feedback`](crate::feedback::Feedback) and
//! [`Prompt`](crate::feedback::Prompt) ports.

pub mod adapter;
pub mod command;
pub mod composite;
pub mod decorator;
pub mod facade;
pub mod mediator;
pub mod observer;
pub mod strategy;
pub mod template;

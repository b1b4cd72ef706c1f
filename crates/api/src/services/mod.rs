//! Business logic services.
//!
//! # Services
//!
//! - `recipes` - Recipe create/update/delete, listing and collection toggles
//! - `subscriptions` - Follow and unfollow authors, subscription listing
//! - `shopping_list` - Aggregate the caller's cart into a text document
//!
//! Services combine repositories with the pure rules in `foodgram-core` and
//! the image store. Handlers stay thin.

pub mod recipes;
pub mod shopping_list;
pub mod subscriptions;

pub use recipes::RecipeService;
pub use subscriptions::SubscriptionService;

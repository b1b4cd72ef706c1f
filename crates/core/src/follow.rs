//! Follow rules between users.

use crate::types::UserId;

/// Why a subscribe or unsubscribe request was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("cannot subscribe to yourself")]
    SelfSubscription,

    #[error("already subscribed")]
    AlreadySubscribed,

    #[error("no such subscription")]
    NotSubscribed,
}

/// Check that `follower` may start following `author`.
///
/// # Errors
///
/// Returns [`SubscriptionError::SelfSubscription`] for a self-follow and
/// [`SubscriptionError::AlreadySubscribed`] when the edge already exists.
pub fn check_subscribe(
    follower: UserId,
    author: UserId,
    already_following: bool,
) -> Result<(), SubscriptionError> {
    if follower == author {
        return Err(SubscriptionError::SelfSubscription);
    }
    if already_following {
        return Err(SubscriptionError::AlreadySubscribed);
    }
    Ok(())
}

/// Check that an unsubscribe removed an edge.
///
/// # Errors
///
/// Returns [`SubscriptionError::NotSubscribed`] when nothing was removed.
pub const fn check_unsubscribe(removed: bool) -> Result<(), SubscriptionError> {
    if removed {
        Ok(())
    } else {
        Err(SubscriptionError::NotSubscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_subscription_rejected() {
        let me = UserId::new(1);
        assert_eq!(
            check_subscribe(me, me, false),
            Err(SubscriptionError::SelfSubscription)
        );
    }

    #[test]
    fn test_duplicate_subscription_rejected() {
        assert_eq!(
            check_subscribe(UserId::new(1), UserId::new(2), true),
            Err(SubscriptionError::AlreadySubscribed)
        );
        assert_eq!(check_subscribe(UserId::new(1), UserId::new(2), false), Ok(()));
    }

    #[test]
    fn test_unsubscribe_without_edge() {
        assert_eq!(check_unsubscribe(false), Err(SubscriptionError::NotSubscribed));
        assert_eq!(check_unsubscribe(true), Ok(()));
    }
}

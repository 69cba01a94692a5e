//! User lifecycle events consumed from the message bus

mod user_event;

pub use user_event::{
    EventEnvelope, UserCreatedEvent, UserDeletedEvent, UserEvent, UserUpdatedEvent,
    USER_CREATED, USER_DELETED, USER_UPDATED,
};

pub mod command_bus;
pub mod error;
pub mod handlers;
pub mod saga;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use command_bus::CommandBus;
pub use error::CommandError;
pub use handlers::{
    CommandHandler, create_auth_user::CreateAuthUserHandler, create_profile::CreateProfileHandler,
    delete_auth_user::DeleteAuthUserHandler,
};
pub use saga::{RegistrationSaga, SagaSubscriber};
pub use services::{
    account::{AccountError, AccountService},
    profile::{ProfileService, ProfileServiceError},
    registration::{RegistrationReceipt, RegistrationService},
};

use registra_core::{
    CreateProfileCommand, EventPublisher, Profile, ProfileCreationFailedEvent, ProfileStore,
    ProfileStoreError, profile_rules,
};

use crate::{error::CommandError, handlers::CommandHandler};

/// Second registration step, only ever driven by the saga.
///
/// Every failure is turned into a [`ProfileCreationFailedEvent`] so that the
/// identity written by the first step is compensated. The only error this
/// handler returns is a failure to publish that event.
pub struct CreateProfileHandler<S, P>
where
    S: ProfileStore,
    P: EventPublisher,
{
    profile_store: S,
    publisher: P,
}

impl<S, P> CreateProfileHandler<S, P>
where
    S: ProfileStore,
    P: EventPublisher,
{
    pub fn new(profile_store: S, publisher: P) -> Self {
        Self {
            profile_store,
            publisher,
        }
    }

    async fn create(&self, command: &CreateProfileCommand) -> Result<(), CommandError> {
        let existing = self.profile_store.find_by_auth_id(command.auth_id()).await?;
        if !profile_rules::can_create_profile(existing.as_ref()) {
            tracing::info!("Profile already exists for identity, skipping");
            return Ok(());
        }

        let age =
            profile_rules::validate_profile(command.name(), command.lastname(), command.age())?;
        let profile = Profile::new(
            command.profile_id().clone(),
            command.auth_id().clone(),
            command.name().trim().to_owned(),
            command.lastname().trim().to_owned(),
            age,
        );

        match self.profile_store.create(profile).await {
            // A duplicate delivery got there first, or compensation already
            // reserved the id
            Err(ProfileStoreError::AlreadyExists) => Ok(()),
            result => Ok(result?),
        }
    }
}

#[async_trait::async_trait]
impl<S, P> CommandHandler<CreateProfileCommand> for CreateProfileHandler<S, P>
where
    S: ProfileStore,
    P: EventPublisher,
{
    #[tracing::instrument(
        name = "CreateProfileHandler::handle",
        skip_all,
        fields(auth_id = %command.auth_id(), profile_id = %command.profile_id())
    )]
    async fn handle(&self, command: CreateProfileCommand) -> Result<(), CommandError> {
        let Err(err) = self.create(&command).await else {
            tracing::info!("Profile created");
            return Ok(());
        };

        tracing::error!(error = %err, "Profile creation failed, requesting compensation");
        let event = ProfileCreationFailedEvent::new(
            command.auth_id().clone(),
            command.profile_id().clone(),
            err.to_string(),
        );
        self.publisher.publish(event.into()).await?;

        Ok(())
    }
}

//! Commands: immutable requests routed by the command bus to exactly one
//! handler.

use std::fmt;

use secrecy::Secret;

use crate::domain::ids::{AuthId, ProfileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateAuthUser,
    CreateProfile,
    DeleteAuthUser,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::CreateAuthUser => f.write_str("CreateAuthUser"),
            CommandKind::CreateProfile => f.write_str("CreateProfile"),
            CommandKind::DeleteAuthUser => f.write_str("DeleteAuthUser"),
        }
    }
}

/// Raw registration input, not yet validated.
#[derive(Debug, Clone)]
pub struct RegistrationData {
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub name: String,
    pub lastname: String,
    pub age: i64,
}

#[derive(Debug, Clone)]
pub struct CreateAuthUserCommand {
    registration: RegistrationData,
    auth_id: AuthId,
    profile_id: ProfileId,
}

impl CreateAuthUserCommand {
    pub fn new(registration: RegistrationData, auth_id: AuthId, profile_id: ProfileId) -> Self {
        Self {
            registration,
            auth_id,
            profile_id,
        }
    }

    pub fn registration(&self) -> &RegistrationData {
        &self.registration
    }

    pub fn auth_id(&self) -> &AuthId {
        &self.auth_id
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProfileCommand {
    profile_id: ProfileId,
    auth_id: AuthId,
    name: String,
    lastname: String,
    age: i64,
}

impl CreateProfileCommand {
    pub fn new(
        profile_id: ProfileId,
        auth_id: AuthId,
        name: String,
        lastname: String,
        age: i64,
    ) -> Self {
        Self {
            profile_id,
            auth_id,
            name,
            lastname,
            age,
        }
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn auth_id(&self) -> &AuthId {
        &self.auth_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn age(&self) -> i64 {
        self.age
    }
}

/// Compensation for a registration whose profile step failed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteAuthUserCommand {
    auth_id: AuthId,
    profile_id: ProfileId,
}

impl DeleteAuthUserCommand {
    pub fn new(auth_id: AuthId, profile_id: ProfileId) -> Self {
        Self {
            auth_id,
            profile_id,
        }
    }

    pub fn auth_id(&self) -> &AuthId {
        &self.auth_id
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    CreateAuthUser(CreateAuthUserCommand),
    CreateProfile(CreateProfileCommand),
    DeleteAuthUser(DeleteAuthUserCommand),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::CreateAuthUser(_) => CommandKind::CreateAuthUser,
            Command::CreateProfile(_) => CommandKind::CreateProfile,
            Command::DeleteAuthUser(_) => CommandKind::DeleteAuthUser,
        }
    }
}

impl From<CreateAuthUserCommand> for Command {
    fn from(command: CreateAuthUserCommand) -> Self {
        Command::CreateAuthUser(command)
    }
}

impl From<CreateProfileCommand> for Command {
    fn from(command: CreateProfileCommand) -> Self {
        Command::CreateProfile(command)
    }
}

impl From<DeleteAuthUserCommand> for Command {
    fn from(command: DeleteAuthUserCommand) -> Self {
        Command::DeleteAuthUser(command)
    }
}

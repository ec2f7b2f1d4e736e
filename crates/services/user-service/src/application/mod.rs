//! Commands, queries and the handler table the mediator dispatches to.

mod commands;
mod queries;

use std::sync::Arc;

use common::auth::TokenProvider;
use common::{handler_table, Mediator};

use crate::repository::UserScope;

pub use commands::{
    CreateUserCommand, CreateUserHandler, DeleteUserCommand, DeleteUserHandler, LoginUserCommand,
    LoginUserHandler, UpdateUserCommand, UpdateUserHandler,
};
pub use queries::{GetUserByEmailHandler, GetUserByEmailQuery, GetUserHandler, GetUserQuery};

/// One handler per user request type.
pub struct UserHandlers {
    create: CreateUserHandler,
    update: UpdateUserHandler,
    delete: DeleteUserHandler,
    login: LoginUserHandler,
    get: GetUserHandler,
    get_by_email: GetUserByEmailHandler,
}

impl UserHandlers {
    /// Wire every handler to the same request scope.
    pub fn new(scope: UserScope, tokens: Arc<TokenProvider>) -> Self {
        let UserScope {
            users,
            unit_of_work,
        } = scope;

        Self {
            create: CreateUserHandler::new(users.clone(), unit_of_work.clone()),
            update: UpdateUserHandler::new(users.clone(), unit_of_work.clone()),
            delete: DeleteUserHandler::new(users.clone(), unit_of_work),
            login: LoginUserHandler::new(users.clone(), tokens),
            get: GetUserHandler::new(users.clone()),
            get_by_email: GetUserByEmailHandler::new(users),
        }
    }
}

handler_table!(UserHandlers {
    CreateUserCommand => create,
    UpdateUserCommand => update,
    DeleteUserCommand => delete,
    LoginUserCommand => login,
    GetUserQuery => get,
    GetUserByEmailQuery => get_by_email,
});

/// Mediator over the user handler table.
pub type UserMediator = Mediator<UserHandlers>;

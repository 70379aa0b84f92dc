//! `SeaORM` entity definitions.

pub mod documents;
pub mod users;

pub mod prelude {
    //! Re-exports of every entity type.

    pub use super::documents::Entity as Documents;
    pub use super::users::Entity as Users;
}

use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// User model for reading from database
/// Derives QueryableByName as well so raw SQL listings can load it
#[derive(Debug, Queryable, QueryableByName, Selectable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: Timestamp,
    pub created_by: String,
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub deleted_by: Option<String>,
}

/// NewUser model for inserting new records
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub email: String,
    pub created_at: Timestamp,
    pub created_by: String,
}

/// UpdateUser model for updates
/// `None` fields are left unchanged
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<String>,
}

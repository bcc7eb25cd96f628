//! Migrations compiled into the binary with include_str!

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All migrations, in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_authority",
            sql: include_str!("../../migrations/001_authority.sql"),
        },
        Migration {
            id: "002_authority_name_index",
            sql: include_str!("../../migrations/002_authority_name_index.sql"),
        },
    ]
}

//! Schema registry and SQL query constants.
//!
//! This module contains the table definitions created at bootstrap and the
//! statements issued by the user handlers, following the Functional Core
//! pattern - pure data, no I/O. All SQL uses `?` positional parameters, which
//! both the embedded and the remote engine accept.

/// A registered table and the statement that creates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEntry {
    pub name: &'static str,
    pub create_statement: &'static str,
}

/// Users table.
pub const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

/// Posts table.
pub const CREATE_POSTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

/// Every table the service needs, in creation order.
///
/// A slice keeps iteration order identical across runs.
pub const SCHEMAS: &[SchemaEntry] = &[
    SchemaEntry {
        name: "users",
        create_statement: CREATE_USERS_TABLE,
    },
    SchemaEntry {
        name: "posts",
        create_statement: CREATE_POSTS_TABLE,
    },
];

// User queries
pub const SELECT_USERS: &str = "SELECT id, username, email FROM users";

pub const SELECT_USER_BY_ID: &str = "SELECT id, username, email FROM users WHERE id = ?";

pub const SELECT_USER_ID_BY_EMAIL: &str = "SELECT id FROM users WHERE email = ?";

pub const INSERT_USER: &str = "INSERT INTO users (username, email, created_at) VALUES (?, ?, ?)";

pub const DELETE_USER: &str = "DELETE FROM users WHERE id = ?";

// Health
pub const PING: &str = "SELECT 1 AS ok";

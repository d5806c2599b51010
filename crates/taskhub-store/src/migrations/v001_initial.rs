//! v001 -- Initial schema creation.
//!
//! Creates the user, group and task tables together with the two join tables
//! `usergroup_user` and `taskcontainer_task`. Foreign keys carry
//! no `ON DELETE CASCADE`: the store removes join rows itself, child first.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS user (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT NOT NULL UNIQUE,          -- external id from the auth provider
    username   TEXT NOT NULL,
    first_name TEXT NOT NULL DEFAULT '',
    last_name  TEXT NOT NULL DEFAULT '',
    email      TEXT NOT NULL,
    is_active  INTEGER NOT NULL DEFAULT 1,    -- boolean 0/1
    created_at TEXT NOT NULL,                 -- RFC-3339
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_email ON user(email);
CREATE INDEX IF NOT EXISTS idx_user_username ON user(username);

-- One settings row per user, written in the same transaction as the user.
CREATE TABLE IF NOT EXISTS usersetting (
    user_id          INTEGER PRIMARY KEY NOT NULL,
    default_group_id INTEGER NOT NULL DEFAULT 0 CHECK (default_group_id >= 0),

    FOREIGN KEY (user_id) REFERENCES user(id)
);

-- ----------------------------------------------------------------
-- User groups
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS usergroup (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL CHECK (name <> ''),
    description  TEXT NOT NULL DEFAULT '',
    type         TEXT NOT NULL CHECK (type <> ''),
    thumbnailurl TEXT NOT NULL DEFAULT '',
    is_active    INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS usergroup_user (
    usergroup_id INTEGER NOT NULL,
    user_id      INTEGER NOT NULL,

    PRIMARY KEY (usergroup_id, user_id),
    FOREIGN KEY (usergroup_id) REFERENCES usergroup(id),
    FOREIGN KEY (user_id) REFERENCES user(id)
);

CREATE INDEX IF NOT EXISTS idx_usergroup_user_user ON usergroup_user(user_id);

-- ----------------------------------------------------------------
-- Task containers
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS taskcontainer (
    id             TEXT PRIMARY KEY NOT NULL, -- UUID v4
    name           TEXT NOT NULL,
    description    TEXT NOT NULL DEFAULT '',
    type           TEXT NOT NULL DEFAULT '',
    is_active      INTEGER NOT NULL DEFAULT 1,
    activity_level INTEGER NOT NULL DEFAULT 0,
    usergroup_id   INTEGER NOT NULL,

    FOREIGN KEY (usergroup_id) REFERENCES usergroup(id)
);

CREATE INDEX IF NOT EXISTS idx_taskcontainer_usergroup ON taskcontainer(usergroup_id);

-- ----------------------------------------------------------------
-- Tasks
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS task (
    id           TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name         TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    type         TEXT NOT NULL DEFAULT '',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    target_date  TEXT,
    priority     TEXT NOT NULL,
    category     TEXT NOT NULL DEFAULT '',
    is_completed INTEGER NOT NULL DEFAULT 0,
    is_important INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS taskcontainer_task (
    taskcontainer_id TEXT NOT NULL,
    task_id          TEXT NOT NULL,

    PRIMARY KEY (taskcontainer_id, task_id),
    FOREIGN KEY (taskcontainer_id) REFERENCES taskcontainer(id),
    FOREIGN KEY (task_id) REFERENCES task(id)
);

CREATE INDEX IF NOT EXISTS idx_taskcontainer_task_task ON taskcontainer_task(task_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}

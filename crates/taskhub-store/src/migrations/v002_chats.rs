use rusqlite::Connection;

// The CHECK mirrors the chat variant table; the partial unique indexes keep at
// most one group chat per group and one chat per container.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS chat (
    id           TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    type         TEXT NOT NULL CHECK (type IN ('private', 'group', 'container')),
    usergroup_id INTEGER,                     -- FK -> usergroup(id)
    container_id TEXT,                        -- FK -> taskcontainer(id)
    created_at   TEXT NOT NULL,

    CHECK (
        (type = 'private'   AND usergroup_id IS NULL     AND container_id IS NULL) OR
        (type = 'group'     AND usergroup_id IS NOT NULL AND container_id IS NULL) OR
        (type = 'container' AND usergroup_id IS NOT NULL AND container_id IS NOT NULL)
    ),
    FOREIGN KEY (usergroup_id) REFERENCES usergroup(id),
    FOREIGN KEY (container_id) REFERENCES taskcontainer(id)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_chat_group ON chat(usergroup_id) WHERE type = 'group';
CREATE UNIQUE INDEX IF NOT EXISTS idx_chat_container ON chat(container_id) WHERE type = 'container';

CREATE TABLE IF NOT EXISTS chat_participant (
    id        TEXT PRIMARY KEY NOT NULL,      -- UUID v4
    chat_id   TEXT NOT NULL,                  -- FK -> chat(id)
    user_id   INTEGER NOT NULL,               -- FK -> user(id)
    joined_at TEXT NOT NULL,
    role      TEXT NOT NULL CHECK (role IN ('admin', 'member')),
    status    TEXT NOT NULL CHECK (status IN ('active', 'left', 'banned', 'muted', 'pending')),

    UNIQUE (chat_id, user_id),
    FOREIGN KEY (chat_id) REFERENCES chat(id),
    FOREIGN KEY (user_id) REFERENCES user(id)
);

CREATE INDEX IF NOT EXISTS idx_chat_participant_user ON chat_participant(user_id);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}

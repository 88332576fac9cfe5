//! SQL query constants
//!
//! Contains all SQL statements issued by `PgStore`. Timestamps are cast to
//! `timestamp` so both `timestamp` and `timestamptz` columns decode the same.

/// Reviews joined with their author, newest first
pub const LIST_REVIEWS: &str = r#"
    SELECT r.id, u.username, r.rating::int4 AS rating, r.comment,
           COALESCE(r.is_approved, false) AS is_approved,
           r.created_at::timestamp AS created_at
    FROM reviews r
    JOIN users u ON r.user_id = u.id
    ORDER BY r.created_at DESC, r.id DESC
"#;

pub const INSERT_REVIEW: &str = r#"
    INSERT INTO reviews (user_id, rating, comment, is_approved)
    VALUES ($1::int4, $2::int4, $3, $4)
    RETURNING id
"#;

pub const SET_REVIEW_APPROVAL: &str = r#"
    UPDATE reviews SET is_approved = $1 WHERE id = $2::int4
"#;

pub const FIND_USER_BY_CREDENTIALS: &str = r#"
    SELECT id, username, password, COALESCE(is_admin, false) AS is_admin
    FROM users
    WHERE username = $1 AND password = $2
    LIMIT 1
"#;

pub const FIND_USERS_BY_USERNAME: &str = r#"
    SELECT id, username, password, COALESCE(is_admin, false) AS is_admin
    FROM users
    WHERE username = $1
    ORDER BY id
"#;

pub const FIND_USER_BY_ID: &str = r#"
    SELECT id, username, password, COALESCE(is_admin, false) AS is_admin
    FROM users
    WHERE id = $1::int4
"#;

pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, password, is_admin)
    VALUES ($1, $2, false)
    RETURNING id, username, COALESCE(is_admin, false) AS is_admin
"#;

/// Most recent game-info row
pub const LATEST_GAME_INFO: &str = r#"
    SELECT id, title, description, cover_url, steam_url,
           updated_at::timestamp AS updated_at
    FROM game_info
    ORDER BY id DESC
    LIMIT 1
"#;

/// Overwrite the singleton row in place
pub const UPDATE_GAME_INFO: &str = r#"
    UPDATE game_info
    SET title = $1, description = $2, cover_url = $3, steam_url = $4,
        updated_at = CURRENT_TIMESTAMP
    WHERE id = $5::int4
"#;

//! Table definitions, applied at connect time.

pub(crate) const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL DEFAULT 'user',
        created_at    TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tournaments (
        id              TEXT PRIMARY KEY,
        name            TEXT NOT NULL,
        description     TEXT,
        venue           TEXT NOT NULL,
        poster_url      TEXT,
        gmaps_link      TEXT,
        start_date      TEXT NOT NULL,
        start_time      TEXT NOT NULL,
        end_date        TEXT NOT NULL,
        end_time        TEXT NOT NULL,
        price           REAL NOT NULL DEFAULT 0,
        status          TEXT NOT NULL DEFAULT 'scheduled',
        capacity        INTEGER NOT NULL DEFAULT 32,
        created_by      TEXT REFERENCES users(id) ON DELETE SET NULL,
        accept_entries  INTEGER NOT NULL DEFAULT 1,
        bracket_data    TEXT,
        status_override TEXT,
        created_at      TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tournament_events (
        id               TEXT PRIMARY KEY,
        tournament_id    TEXT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        name             TEXT NOT NULL,
        category         TEXT,
        entry_fee        REAL NOT NULL DEFAULT 0,
        max_participants INTEGER NOT NULL DEFAULT 32,
        description      TEXT,
        created_at       TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tournament_registrations (
        id               TEXT PRIMARY KEY,
        tournament_id    TEXT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        participant_name TEXT NOT NULL,
        phone            TEXT NOT NULL,
        email            TEXT NOT NULL,
        academy_name     TEXT,
        selected_venue   TEXT,
        payment_id       TEXT,
        status           TEXT NOT NULL DEFAULT 'pending',
        joined_at        TEXT NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_registrations_settlement
        ON tournament_registrations (tournament_id, email, status)"#,
    r#"CREATE TABLE IF NOT EXISTS tournament_brackets (
        id            TEXT PRIMARY KEY,
        tournament_id TEXT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        bracket_data  TEXT,
        matches       TEXT NOT NULL DEFAULT '[]',
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS products (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT,
        price       REAL NOT NULL,
        stock       INTEGER NOT NULL DEFAULT 0,
        category    TEXT,
        image_url   TEXT,
        seller_id   TEXT REFERENCES users(id) ON DELETE SET NULL,
        created_at  TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS orders (
        id            TEXT PRIMARY KEY,
        customer_name TEXT NOT NULL,
        email         TEXT NOT NULL,
        phone         TEXT NOT NULL,
        address       TEXT NOT NULL,
        city          TEXT NOT NULL,
        zip_code      TEXT NOT NULL,
        items         TEXT NOT NULL,
        total_amount  REAL NOT NULL,
        payment_id    TEXT,
        status        TEXT NOT NULL DEFAULT 'pending',
        created_at    TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS payments (
        id                 TEXT PRIMARY KEY,
        transaction_id     TEXT NOT NULL UNIQUE,
        amount_minor       INTEGER NOT NULL,
        currency           TEXT NOT NULL DEFAULT 'INR',
        payment_method     TEXT,
        user_email         TEXT NOT NULL,
        reference_id       TEXT NOT NULL,
        reference_type     TEXT NOT NULL,
        status             TEXT NOT NULL DEFAULT 'pending',
        payment_reference  TEXT,
        payment_proof_url  TEXT,
        verification_token TEXT NOT NULL UNIQUE,
        transaction_hash   TEXT NOT NULL UNIQUE,
        created_at         TEXT NOT NULL,
        verified_at        TEXT
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_payments_duplicate_guard
        ON payments (user_email, reference_id, amount_minor, status)"#,
];
